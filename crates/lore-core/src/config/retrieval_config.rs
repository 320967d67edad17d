use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::StrategyKind;

/// Strategy runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Passages requested from the store per search call.
    pub results_per_strategy: usize,
    /// Alternative phrasings generated by query expansion (clamped to 3–5).
    pub expansion_queries: usize,
    /// Per-runner timeout. A runner that exceeds it counts as failed.
    pub runner_timeout_ms: u64,
    /// Overall deadline for one routed request across all targets.
    pub request_timeout_ms: u64,
    /// Strategies to run for every target.
    pub strategies: Vec<StrategyKind>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            results_per_strategy: defaults::DEFAULT_RESULTS_PER_STRATEGY,
            expansion_queries: defaults::DEFAULT_EXPANSION_QUERIES,
            runner_timeout_ms: defaults::DEFAULT_RUNNER_TIMEOUT_MS,
            request_timeout_ms: defaults::DEFAULT_REQUEST_TIMEOUT_MS,
            strategies: StrategyKind::ALL.to_vec(),
        }
    }
}
