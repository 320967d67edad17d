use super::{ConfigError, FeedbackError, OracleError, PassageStoreError, StorageError};

/// Top-level error for every Lore operation.
///
/// Failures that are contained inside a request (a strategy, the reranker)
/// never become errors; they are reported as `Degradation`s on the answer.
#[derive(Debug, thiserror::Error)]
pub enum LoreError {
    #[error("synthesis failed: {reason}")]
    SynthesisFailed { reason: String },

    #[error("correction {record_id} rejected: {reason}")]
    FeedbackValidationRejected { record_id: String, reason: String },

    #[error("no knowledge base configured for query mode {mode}")]
    NoTargets { mode: String },

    #[error("every domain pipeline failed: {domains}")]
    AllTargetsFailed { domains: String },

    #[error("request cancelled")]
    Cancelled,

    #[error("request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("oracle error: {0}")]
    OracleError(#[from] OracleError),

    #[error("passage store error: {0}")]
    PassageStoreError(#[from] PassageStoreError),

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("feedback error: {0}")]
    FeedbackError(#[from] FeedbackError),

    #[error("config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type LoreResult<T> = Result<T, LoreError>;

impl LoreError {
    /// Text safe to show an end user: actionable, no internal detail.
    pub fn user_message(&self) -> String {
        match self {
            LoreError::NoTargets { .. } => {
                "No knowledge base is configured for this kind of question. \
                 Try asking in smart mode or pick a different knowledge base."
                    .to_string()
            }
            LoreError::AllTargetsFailed { .. } | LoreError::PassageStoreError(_) => {
                "The knowledge base is unavailable right now (schema unavailable). \
                 Please try again in a moment."
                    .to_string()
            }
            LoreError::Timeout { .. } => {
                "The question took too long to answer. Try rephrasing it more specifically."
                    .to_string()
            }
            LoreError::Cancelled => "The request was cancelled.".to_string(),
            LoreError::SynthesisFailed { .. } | LoreError::OracleError(_) => {
                "I couldn't generate an answer right now. Please try rephrasing your question."
                    .to_string()
            }
            _ => "Something went wrong while answering. Please try rephrasing your question."
                .to_string(),
        }
    }

    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LoreError::StorageError(e) => e.is_transient(),
            LoreError::OracleError(e) => e.is_transient(),
            LoreError::PassageStoreError(e) => e.is_transient(),
            LoreError::Timeout { .. } => true,
            _ => false,
        }
    }
}
