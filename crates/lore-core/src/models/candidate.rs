use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Retrieval strategy tag.
///
/// Declaration order is the merge tie-break priority: Standard, Expansion, HyDE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Standard,
    Expansion,
    Hyde,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Standard,
        StrategyKind::Expansion,
        StrategyKind::Hyde,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Standard => "standard",
            StrategyKind::Expansion => "expansion",
            StrategyKind::Hyde => "hyde",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a passage inside a collection. Identity is `passage_id` alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassageRef {
    pub passage_id: String,
    pub source_uri: Option<String>,
    pub chunk_id: Option<String>,
}

impl PassageRef {
    pub fn new(passage_id: impl Into<String>) -> Self {
        Self {
            passage_id: passage_id.into(),
            source_uri: None,
            chunk_id: None,
        }
    }
}

/// A passage found by one or more strategies, with its raw relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalCandidate {
    pub passage: PassageRef,
    pub text: String,
    /// Raw score from the originating strategy (max across strategies after merge).
    pub score: f64,
    /// Strategies that surfaced this passage. Diagnostic only, never used in scoring.
    pub provenance: BTreeSet<StrategyKind>,
}

impl RetrievalCandidate {
    pub fn new(
        passage: PassageRef,
        text: impl Into<String>,
        score: f64,
        strategy: StrategyKind,
    ) -> Self {
        Self {
            passage,
            text: text.into(),
            score,
            provenance: BTreeSet::from([strategy]),
        }
    }

    pub fn passage_id(&self) -> &str {
        &self.passage.passage_id
    }

    /// Highest-priority strategy that found this passage.
    pub fn origin(&self) -> Option<StrategyKind> {
        self.provenance.iter().next().copied()
    }
}
