//! Frame delta clock
//!
//! Timestamps are milliseconds as delivered by `requestAnimationFrame`
//! (or any monotonic source on native).

/// Measures the time between consecutive frames
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start the clock at `now_ms`; the next delta is measured from here
    pub fn start(&mut self, now_ms: f64) {
        self.last_ms = Some(now_ms);
    }

    pub fn is_running(&self) -> bool {
        self.last_ms.is_some()
    }

    /// Seconds since the previous call (or since `start`).
    ///
    /// A clock that was never started starts now and reports zero.
    pub fn delta(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last_ms {
            Some(last) => ((now_ms - last).max(0.0) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_delta_autostarts() {
        let mut clock = FrameClock::new();
        assert!(!clock.is_running());
        assert_eq!(clock.delta(500.0), 0.0);
        assert!(clock.is_running());
        assert!((clock.delta(516.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_restart_drops_paused_time() {
        let mut clock = FrameClock::new();
        clock.start(0.0);
        clock.delta(16.0);
        clock.start(60_000.0);
        assert!((clock.delta(60_016.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_backwards_time_is_zero() {
        let mut clock = FrameClock::new();
        clock.start(100.0);
        assert_eq!(clock.delta(50.0), 0.0);
    }
}
