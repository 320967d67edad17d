/// Passage store (vector index) errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PassageStoreError {
    #[error("passage store unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("collection not found: {collection}")]
    CollectionNotFound { collection: String },

    #[error("passage store call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("malformed passage store response: {reason}")]
    MalformedResponse { reason: String },

    #[error("ingestion rejected for collection {collection}: {reason}")]
    IngestionRejected { collection: String, reason: String },
}

impl PassageStoreError {
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PassageStoreError::Unavailable { .. } | PassageStoreError::Timeout { .. }
        )
    }
}
