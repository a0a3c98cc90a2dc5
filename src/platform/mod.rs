//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Asset fetching (HTTP relative to the page origin on web, `./` on native)
//! - Run seeds

use anyhow::Context;

#[cfg(target_arch = "wasm32")]
fn asset_url(path: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window")?;
    let href = window
        .location()
        .href()
        .map_err(|e| anyhow::anyhow!("no location: {:?}", e))?;
    let base = reqwest::Url::parse(&href)?;
    Ok(base.join(path)?)
}

/// Fetch the raw bytes of an asset
pub async fn load_binary(path: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = asset_url(path)?;
        let response = reqwest::get(url.clone())
            .await?
            .error_for_status()
            .with_context(|| format!("fetching {}", url))?;
        response.bytes().await?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join(path);
        std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?
    };

    Ok(data)
}

/// Seed for a new run
pub fn run_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
