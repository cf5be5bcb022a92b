use serde::{Deserialize, Serialize};

use crate::DEFAULT_RATE_LIMIT_THRESHOLD;

/// Configuration of one receiving session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Start frozen: ingestion and tick rollover are suspended.
    pub freeze: bool,
    pub rate_limit_enabled: bool,
    /// Frames per tick above which the following tick is discarded.
    pub rate_limit_threshold: u32,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            freeze: false,
            rate_limit_enabled: true,
            rate_limit_threshold: DEFAULT_RATE_LIMIT_THRESHOLD,
        }
    }
}
