//! Runtime settings
//!
//! Read from LocalStorage as JSON when present; missing fields fall back to
//! defaults so older saved settings keep working.

use serde::{Deserialize, Serialize};

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Multisampled rendering (4x MSAA)
    pub antialias: bool,
    /// Path prefix the obstacle textures are fetched from
    pub asset_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            antialias: true,
            asset_prefix: "assets".to_string(),
        }
    }
}

impl Settings {
    /// MSAA sample count for the render targets
    pub fn sample_count(&self) -> u32 {
        if self.antialias { 4 } else { 1 }
    }

    /// Asset path for `file_name` under the configured prefix
    pub fn asset_path(&self, file_name: &str) -> String {
        let prefix = self.asset_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", prefix, file_name)
        }
    }

    /// Parse settings JSON, falling back to defaults on bad input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring invalid settings: {}", e);
                Self::default()
            }
        }
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "grid_glider_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.antialias);
        assert_eq!(settings.sample_count(), 4);
        assert_eq!(settings.asset_path("obstacle1.png"), "assets/obstacle1.png");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"antialias": false}"#);
        assert!(!settings.antialias);
        assert_eq!(settings.sample_count(), 1);
        assert_eq!(settings.asset_prefix, "assets");
    }

    #[test]
    fn test_invalid_json_falls_back() {
        assert_eq!(Settings::from_json("not json"), Settings::default());
    }

    #[test]
    fn test_asset_prefix_trailing_slash() {
        let settings = Settings {
            asset_prefix: "static/img/".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.asset_path("obstacle2.png"), "static/img/obstacle2.png");

        let bare = Settings {
            asset_prefix: String::new(),
            ..Default::default()
        };
        assert_eq!(bare.asset_path("obstacle2.png"), "obstacle2.png");
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            antialias: false,
            asset_prefix: "cdn".to_string(),
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json), settings);
    }
}
