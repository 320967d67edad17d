use serde::{Deserialize, Serialize};

use super::defaults;

/// HTTP passage store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PassageStoreConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub timeout_ms: u64,
}

impl Default for PassageStoreConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::DEFAULT_PASSAGE_STORE_URL.to_string(),
            api_key_env: defaults::DEFAULT_PASSAGE_STORE_API_KEY_ENV.to_string(),
            timeout_ms: defaults::DEFAULT_PASSAGE_STORE_TIMEOUT_MS,
        }
    }
}
