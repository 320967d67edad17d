use serde::{Deserialize, Serialize};

use super::defaults;

/// LLM oracle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Provider name, used for logging and auth decisions.
    pub provider: String,
    /// OpenAI-compatible base URL.
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Default model for every call.
    pub model: String,
    /// Optional embedding model; without one the passage store embeds text itself.
    pub embedding_model: Option<String>,
    pub embedding_dimensions: usize,
    pub expansion_temperature: f32,
    pub expansion_max_tokens: u32,
    pub hyde_temperature: f32,
    pub hyde_max_tokens: u32,
    pub timeout_ms: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: defaults::DEFAULT_ORACLE_PROVIDER.to_string(),
            base_url: defaults::DEFAULT_ORACLE_BASE_URL.to_string(),
            api_key_env: defaults::DEFAULT_ORACLE_API_KEY_ENV.to_string(),
            model: defaults::DEFAULT_ORACLE_MODEL.to_string(),
            embedding_model: None,
            embedding_dimensions: 1536,
            expansion_temperature: defaults::DEFAULT_EXPANSION_TEMPERATURE,
            expansion_max_tokens: defaults::DEFAULT_EXPANSION_MAX_TOKENS,
            hyde_temperature: defaults::DEFAULT_HYDE_TEMPERATURE,
            hyde_max_tokens: defaults::DEFAULT_HYDE_MAX_TOKENS,
            timeout_ms: defaults::DEFAULT_ORACLE_TIMEOUT_MS,
        }
    }
}
