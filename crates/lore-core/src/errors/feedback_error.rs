/// Feedback lifecycle errors: state machine and invariant violations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedbackError {
    #[error("invalid {entity} transition for {id}: {from} -> {to}")]
    InvalidTransition {
        entity: String,
        id: String,
        from: String,
        to: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("{entity} {id} changed concurrently: expected {expected}, found {actual}")]
    StatusConflict {
        entity: String,
        id: String,
        expected: String,
        actual: String,
    },

    #[error("invariant violated: {reason}")]
    InvariantViolation { reason: String },
}
