use serde::{Deserialize, Serialize};

use super::defaults;

/// Session persistence side-channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub enabled: bool,
    /// Events buffered before new ones are dropped.
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_SESSION_ENABLED,
            channel_capacity: defaults::DEFAULT_SESSION_CHANNEL_CAPACITY,
        }
    }
}
