/// LLM / embedding oracle errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OracleError {
    #[error("oracle {provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },

    #[error("oracle call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("oracle returned an empty response")]
    EmptyResponse,

    #[error("malformed oracle response: {reason}")]
    MalformedResponse { reason: String },

    #[error("API key missing for provider {provider}")]
    ApiKeyMissing { provider: String },

    #[error("oracle HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

impl OracleError {
    pub fn is_transient(&self) -> bool {
        match self {
            OracleError::Unavailable { .. } | OracleError::Timeout { .. } => true,
            OracleError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
