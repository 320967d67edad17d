use serde::{Deserialize, Serialize};

use super::defaults;

/// Feedback generalizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// SQLite file holding correction, training, and improvement records.
    pub db_path: String,
    /// Attempts for transient storage failures (offline path only).
    pub max_retries: u32,
    /// Linear backoff step between attempts.
    pub retry_backoff_ms: u64,
    /// Weight assigned to new training examples before category adjustment.
    pub default_weight: f64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DEFAULT_FEEDBACK_DB_PATH.to_string(),
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            retry_backoff_ms: defaults::DEFAULT_RETRY_BACKOFF_MS,
            default_weight: defaults::DEFAULT_EXAMPLE_WEIGHT,
        }
    }
}
