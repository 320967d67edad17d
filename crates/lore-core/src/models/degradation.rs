use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which contained failure produced a degradation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationKind {
    /// No keyword matched; the fallback domain was chosen.
    ClassificationDefault,
    /// One retrieval path was unavailable.
    StrategyFailed,
    /// The relevance oracle failed; merge order was kept.
    RerankUnavailable,
    /// Answer generation failed; an apologetic answer was returned.
    SynthesisFailed,
}

/// A degradation observed while answering one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Degradation {
    pub kind: DegradationKind,
    pub component: String,
    pub failure: String,
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}

impl Degradation {
    pub fn new(
        kind: DegradationKind,
        component: impl Into<String>,
        failure: impl Into<String>,
        fallback_used: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            component: component.into(),
            failure: failure.into(),
            fallback_used: fallback_used.into(),
            timestamp: Utc::now(),
        }
    }
}
