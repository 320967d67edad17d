//! ObservabilityEngine: shared sink for per-request diagnostics.

use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use lore_core::models::Answer;

use crate::degradation::DegradationTracker;
use crate::metrics::RetrievalMetrics;
use crate::query_log::{QueryLog, QueryLogEntry};

/// Point-in-time summary for operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    pub queries: usize,
    pub avg_latency_ms: u64,
    pub degraded_rate: f64,
    pub active_degradations: usize,
    pub metrics: RetrievalMetrics,
}

#[derive(Default)]
pub struct ObservabilityEngine {
    query_log: Mutex<QueryLog>,
    metrics: Mutex<RetrievalMetrics>,
    degradations: Mutex<DegradationTracker>,
}

impl ObservabilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished request. Poisoned locks skip recording rather than fail the request.
    pub fn record_answer(
        &self,
        query: &str,
        answer: &Answer,
        latency: Duration,
        cache_hits: usize,
        cache_misses: usize,
    ) {
        let context_count = answer.contexts.as_ref().map_or(0, Vec::len);
        if let Ok(mut log) = self.query_log.lock() {
            log.record(QueryLogEntry::new(
                query,
                answer.primary_domain(),
                latency,
                context_count,
                answer.degradations.len(),
                cache_hits,
            ));
        }
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.record_answer(answer);
            metrics.record_cache(cache_hits as u64, cache_misses as u64);
        }
        if let Ok(mut tracker) = self.degradations.lock() {
            for degradation in &answer.degradations {
                tracker.record(degradation.clone());
            }
        }
    }

    pub fn mark_recovered(&self, component: &str) {
        if let Ok(mut tracker) = self.degradations.lock() {
            tracker.mark_recovered(component);
        }
    }

    pub fn report(&self) -> DiagnosticsReport {
        let (queries, avg_latency_ms, degraded_rate) = self
            .query_log
            .lock()
            .map(|log| {
                (
                    log.entries().len(),
                    log.avg_latency().as_millis() as u64,
                    log.degraded_rate(),
                )
            })
            .unwrap_or((0, 0, 0.0));
        DiagnosticsReport {
            queries,
            avg_latency_ms,
            degraded_rate,
            active_degradations: self
                .degradations
                .lock()
                .map(|t| t.active_degradations().len())
                .unwrap_or(0),
            metrics: self
                .metrics
                .lock()
                .map(|m| m.clone())
                .unwrap_or_default(),
        }
    }
}
