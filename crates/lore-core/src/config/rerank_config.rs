use serde::{Deserialize, Serialize};

use super::defaults;

/// Reranker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// When false the reranker keeps merge order without calling the oracle.
    pub enabled: bool,
    /// Candidates beyond this many (by merge order) are dropped before reranking.
    pub max_candidates: usize,
    /// Contexts handed to the synthesizer.
    pub top_k: usize,
    /// Oracle scores below this are filtered out.
    pub min_relevance: f64,
    pub max_tokens: u32,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_RERANK_ENABLED,
            max_candidates: defaults::DEFAULT_RERANK_MAX_CANDIDATES,
            top_k: defaults::DEFAULT_RERANK_TOP_K,
            min_relevance: defaults::DEFAULT_MIN_RELEVANCE,
            max_tokens: defaults::DEFAULT_RERANK_MAX_TOKENS,
        }
    }
}
