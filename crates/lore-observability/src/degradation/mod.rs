//! Degradation tracking: every contained failure with its fallback.

mod tracker;

pub use tracker::{DegradationTracker, RecoveryStatus, TrackedDegradation};
