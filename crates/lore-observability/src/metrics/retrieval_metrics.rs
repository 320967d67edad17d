//! Per-domain query counts, per-strategy failures, rerank fallbacks, cache effectiveness.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use lore_core::models::{Answer, DegradationKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalMetrics {
    pub queries_by_domain: BTreeMap<String, u64>,
    pub strategy_failures: BTreeMap<String, u64>,
    pub rerank_fallbacks: u64,
    pub synthesis_failures: u64,
    pub classification_defaults: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl RetrievalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_answer(&mut self, answer: &Answer) {
        if let Some(primary) = answer.primary_domain() {
            *self
                .queries_by_domain
                .entry(primary.as_str().to_string())
                .or_default() += 1;
        }
        for degradation in &answer.degradations {
            match degradation.kind {
                DegradationKind::StrategyFailed => {
                    *self
                        .strategy_failures
                        .entry(degradation.component.clone())
                        .or_default() += 1;
                }
                DegradationKind::RerankUnavailable => self.rerank_fallbacks += 1,
                DegradationKind::SynthesisFailed => self.synthesis_failures += 1,
                DegradationKind::ClassificationDefault => self.classification_defaults += 1,
            }
        }
    }

    pub fn record_cache(&mut self, hits: u64, misses: u64) {
        self.cache_hits += hits;
        self.cache_misses += misses;
    }

    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            return 0.0;
        }
        self.cache_hits as f64 / total as f64
    }
}
