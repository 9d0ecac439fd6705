use std::time::Duration;

use serde::Serialize;

use crate::config::HitRunConfig;

/// Resolved hit-and-run parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitRunPolicy {
    pub enabled: bool,
    /// Required seed time.
    pub seedtime: Duration,
    /// Share of the torrent size that may be downloaded without obligation.
    pub buffer: f64,
}

impl HitRunPolicy {
    pub fn new(enabled: bool, seedtime_secs: u64, buffer: f64) -> Self {
        Self {
            enabled,
            seedtime: Duration::from_secs(seedtime_secs),
            buffer,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, 0, 0.0)
    }

    /// Bytes of a torrent of `size` bytes that can be downloaded freely.
    pub fn download_allowance(&self, size: u64) -> f64 {
        size as f64 * self.buffer
    }
}

impl From<&HitRunConfig> for HitRunPolicy {
    fn from(config: &HitRunConfig) -> Self {
        Self::new(config.enabled, config.seedtime, config.buffer)
    }
}
