//! # lore-observability
//!
//! Tracing setup, span macros, degradation tracking, query logging, and
//! retrieval metrics, tied together by `ObservabilityEngine`.

pub mod degradation;
pub mod engine;
pub mod metrics;
pub mod query_log;
pub mod tracing_setup;

pub use degradation::{DegradationTracker, RecoveryStatus, TrackedDegradation};
pub use engine::{DiagnosticsReport, ObservabilityEngine};
pub use metrics::RetrievalMetrics;
pub use query_log::{QueryLog, QueryLogEntry};
