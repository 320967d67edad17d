use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::candidate::{PassageRef, StrategyKind};

/// A deduplicated, reranked passage ready for synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedContext {
    pub passage: PassageRef,
    pub text: String,
    /// Final relevance in [0, 1].
    pub score: f64,
    pub explanation: Option<String>,
    pub provenance: BTreeSet<StrategyKind>,
}

impl RankedContext {
    pub fn passage_id(&self) -> &str {
        &self.passage.passage_id
    }
}
