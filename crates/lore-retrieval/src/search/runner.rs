//! Concurrent execution of every strategy against one target.
//!
//! Each strategy runs under its own deadline. A strategy that times out or
//! fails contributes a failed outcome; the others are unaffected. Cancellation
//! aborts the whole run, and nothing from a cancelled run is cached.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};

use lore_core::models::{Degradation, DegradationKind, StrategyKind};
use lore_core::{DomainTarget, LoreError, LoreResult};
use lore_observability::tracing_setup::events;

use super::cache::RetrievalCache;
use crate::strategies::{RetrievalStrategy, StrategyOutcome};

/// Outcomes of one run plus cache accounting.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub outcomes: Vec<StrategyOutcome>,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

/// Component name under which a strategy's degradations are tracked.
pub fn strategy_component(kind: StrategyKind, target: &DomainTarget) -> String {
    format!("strategy.{}.{}", kind, target.domain)
}

impl RunReport {
    pub fn all_failed(&self) -> bool {
        self.outcomes.iter().all(StrategyOutcome::is_failed)
    }

    /// Components of strategies that ran without failing or falling back.
    pub fn clean_components(&self, target: &DomainTarget) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.is_failed() && !outcome.fell_back)
            .map(|outcome| strategy_component(outcome.kind, target))
            .collect()
    }

    /// One degradation per failed or fell-back strategy.
    pub fn degradations(&self, target: &DomainTarget) -> Vec<Degradation> {
        self.outcomes
            .iter()
            .filter_map(|outcome| {
                let component = strategy_component(outcome.kind, target);
                if let Some(reason) = &outcome.failure {
                    Some(Degradation::new(
                        DegradationKind::StrategyFailed,
                        component,
                        reason.clone(),
                        "remaining strategies",
                    ))
                } else if outcome.fell_back {
                    Some(Degradation::new(
                        DegradationKind::StrategyFailed,
                        component,
                        "oracle step unavailable",
                        "raw query",
                    ))
                } else {
                    None
                }
            })
            .collect()
    }
}

pub struct StrategyRunner {
    strategies: Vec<Arc<dyn RetrievalStrategy>>,
    cache: Option<Arc<RetrievalCache>>,
    timeout: Duration,
    k: usize,
}

impl StrategyRunner {
    pub fn new(strategies: Vec<Arc<dyn RetrievalStrategy>>, timeout: Duration, k: usize) -> Self {
        Self {
            strategies,
            cache: None,
            timeout,
            k,
        }
    }

    pub fn with_cache(mut self, cache: Arc<RetrievalCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    pub async fn run(
        &self,
        query: &str,
        target: &DomainTarget,
        cancel: &CancellationToken,
    ) -> LoreResult<RunReport> {
        let runs = self
            .strategies
            .iter()
            .map(|strategy| self.run_one(strategy.as_ref(), query, target));

        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LoreError::Cancelled),
            results = join_all(runs) => results,
        };

        let mut report = RunReport::default();
        for (outcome, cache_hit) in results {
            if let Some(cache) = &self.cache {
                if cache_hit == Some(false) && outcome.is_cacheable() && !cancel.is_cancelled() {
                    let key = RetrievalCache::key(outcome.kind, &target.collection_id, query, self.k);
                    cache.insert(key, outcome.candidates.clone());
                }
            }
            match cache_hit {
                Some(true) => report.cache_hits += 1,
                Some(false) => report.cache_misses += 1,
                None => {}
            }
            report.outcomes.push(outcome);
        }
        Ok(report)
    }

    /// Returns the outcome and, when caching is on, whether it was a cache hit.
    async fn run_one(
        &self,
        strategy: &dyn RetrievalStrategy,
        query: &str,
        target: &DomainTarget,
    ) -> (StrategyOutcome, Option<bool>) {
        let kind = strategy.kind();
        if let Some(cache) = &self.cache {
            let key = RetrievalCache::key(kind, &target.collection_id, query, self.k);
            if let Some(cached) = cache.get(&key) {
                debug!(strategy = %kind, "strategy cache hit");
                let mut outcome = StrategyOutcome::succeeded(kind, cached.as_ref().clone());
                outcome.from_cache = true;
                return (outcome, Some(true));
            }
        }

        let span = lore_observability::strategy_span!(kind, target.collection_id);
        let outcome = match tokio::time::timeout(self.timeout, strategy.run(query, target))
            .instrument(span)
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => StrategyOutcome::failed(
                kind,
                format!("timed out after {}ms", self.timeout.as_millis()),
            ),
        };

        if let Some(reason) = &outcome.failure {
            events::strategy_failed(kind.as_str(), &target.collection_id, reason);
        }
        let hit = self.cache.as_ref().map(|_| false);
        (outcome, hit)
    }
}
