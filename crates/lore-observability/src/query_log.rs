//! Query performance logging: query text, primary domain, latency, context count, degradations, cache hits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use lore_core::Domain;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub query: String,
    pub primary_domain: Option<Domain>,
    pub latency: Duration,
    pub context_count: usize,
    pub degradations: usize,
    pub cache_hits: usize,
    pub timestamp_epoch_ms: i64,
}

impl QueryLogEntry {
    pub fn new(
        query: impl Into<String>,
        primary_domain: Option<Domain>,
        latency: Duration,
        context_count: usize,
        degradations: usize,
        cache_hits: usize,
    ) -> Self {
        Self {
            query: query.into(),
            primary_domain,
            latency,
            context_count,
            degradations,
            cache_hits,
            timestamp_epoch_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Append-only query log with ring-buffer retention.
#[derive(Debug, Clone)]
pub struct QueryLog {
    entries: Vec<QueryLogEntry>,
    max_entries: usize,
}

impl Default for QueryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryLog {
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries,
        }
    }

    pub fn record(&mut self, entry: QueryLogEntry) {
        tracing::debug!(
            event = "query_logged",
            query = %entry.query,
            primary = ?entry.primary_domain,
            latency_ms = entry.latency.as_millis() as u64,
            contexts = entry.context_count,
            degradations = entry.degradations,
            cache_hits = entry.cache_hits,
            "query logged"
        );

        self.entries.push(entry);
        if self.entries.len() > self.max_entries {
            self.entries.drain(..self.entries.len() - self.max_entries);
        }
    }

    pub fn entries(&self) -> &[QueryLogEntry] {
        &self.entries
    }

    pub fn avg_latency(&self) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.entries.iter().map(|e| e.latency).sum();
        total / self.entries.len() as u32
    }

    /// Fraction of queries answered with at least one degradation.
    pub fn degraded_rate(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let degraded = self.entries.iter().filter(|e| e.degradations > 0).count();
        degraded as f64 / self.entries.len() as f64
    }
}
