//! Retrieval strategies. Each turns one query into candidates from one collection.
//!
//! Runners never fail: store errors come back as an outcome carrying a failure
//! reason and no candidates. Oracle-dependent steps fall back to the raw query.

mod expansion;
mod hyde;
mod searcher;
mod standard;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use lore_core::config::LoreConfig;
use lore_core::models::{RetrievalCandidate, StrategyKind};
use lore_core::traits::{CompletionOptions, ILlmOracle};
use lore_core::DomainTarget;

pub use expansion::{parse_phrasings, ExpansionStrategy};
pub use hyde::HydeStrategy;
pub use searcher::PassageSearcher;
pub use standard::StandardStrategy;

/// Result of one strategy run against one target.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome {
    pub kind: StrategyKind,
    pub candidates: Vec<RetrievalCandidate>,
    /// Set when the strategy produced nothing usable.
    pub failure: Option<String>,
    /// True when an oracle step failed and the raw query was used instead.
    pub fell_back: bool,
    pub from_cache: bool,
}

impl StrategyOutcome {
    pub fn succeeded(kind: StrategyKind, candidates: Vec<RetrievalCandidate>) -> Self {
        Self {
            kind,
            candidates,
            failure: None,
            fell_back: false,
            from_cache: false,
        }
    }

    pub fn failed(kind: StrategyKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            candidates: Vec::new(),
            failure: Some(reason.into()),
            fell_back: false,
            from_cache: false,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Only clean successes may be cached.
    pub fn is_cacheable(&self) -> bool {
        !self.is_failed() && !self.fell_back && !self.from_cache
    }
}

#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn run(&self, query: &str, target: &DomainTarget) -> StrategyOutcome;
}

/// Build the configured strategies in priority order.
pub fn build_strategies(
    config: &LoreConfig,
    searcher: Arc<PassageSearcher>,
    oracle: Arc<dyn ILlmOracle>,
) -> Vec<Arc<dyn RetrievalStrategy>> {
    let timeout = Duration::from_millis(config.oracle.timeout_ms);
    let mut kinds = config.retrieval.strategies.clone();
    kinds.sort();
    kinds.dedup();

    kinds
        .into_iter()
        .map(|kind| -> Arc<dyn RetrievalStrategy> {
            match kind {
                StrategyKind::Standard => Arc::new(StandardStrategy::new(searcher.clone())),
                StrategyKind::Expansion => Arc::new(ExpansionStrategy::new(
                    searcher.clone(),
                    oracle.clone(),
                    CompletionOptions {
                        model: config.oracle.model.clone(),
                        max_tokens: config.oracle.expansion_max_tokens,
                        temperature: config.oracle.expansion_temperature,
                        thinking_budget: None,
                        timeout,
                    },
                    config.retrieval.expansion_queries,
                )),
                StrategyKind::Hyde => Arc::new(HydeStrategy::new(
                    searcher.clone(),
                    oracle.clone(),
                    CompletionOptions {
                        model: config.oracle.model.clone(),
                        max_tokens: config.oracle.hyde_max_tokens,
                        temperature: config.oracle.hyde_temperature,
                        thinking_budget: None,
                        timeout,
                    },
                )),
            }
        })
        .collect()
}
