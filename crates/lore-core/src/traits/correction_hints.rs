use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Domain;

/// A validated correction relevant to the current query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionHint {
    pub example_id: String,
    pub query_pattern: String,
    pub correct_response: String,
}

/// Source of user corrections to prioritize during synthesis.
#[async_trait]
pub trait ICorrectionHints: Send + Sync {
    /// Hints for `query_text` in `domain`, best first, at most `limit`.
    async fn hints_for(&self, query_text: &str, domain: Domain, limit: usize)
        -> Vec<CorrectionHint>;
}
