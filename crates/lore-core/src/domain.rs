//! Knowledge domains, query modes, and resolved routing targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// One of the three knowledge categories a query can be routed to.
///
/// Declaration order is the tie-break priority: database > support > documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Database,
    Support,
    Documentation,
}

impl Domain {
    /// All domains in tie-break priority order.
    pub const ALL: [Domain; 3] = [Domain::Database, Domain::Support, Domain::Documentation];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Database => "database",
            Domain::Support => "support",
            Domain::Documentation => "documentation",
        }
    }

    /// Human-facing label used in composed answers.
    pub fn label(self) -> &'static str {
        match self {
            Domain::Database => "Database",
            Domain::Support => "Support",
            Domain::Documentation => "Documentation",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "database" | "db" => Ok(Domain::Database),
            "support" => Ok(Domain::Support),
            "documentation" | "docs" => Ok(Domain::Documentation),
            other => Err(ConfigError::Invalid {
                field: "domain".to_string(),
                reason: format!("unknown domain '{other}'"),
            }),
        }
    }
}

/// Requested routing mode for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QueryMode {
    /// Classify the query and route to the best domain(s).
    #[default]
    Smart,
    /// Skip classification and search exactly this domain.
    Explicit(Domain),
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryMode::Smart => f.write_str("smart"),
            QueryMode::Explicit(domain) => f.write_str(domain.as_str()),
        }
    }
}

impl FromStr for QueryMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("smart") || s.trim().is_empty() {
            return Ok(QueryMode::Smart);
        }
        s.parse::<Domain>().map(QueryMode::Explicit)
    }
}

impl TryFrom<String> for QueryMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QueryMode> for String {
    fn from(mode: QueryMode) -> Self {
        mode.to_string()
    }
}

/// Whether a target's answer is authoritative or supplementary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetRole {
    Primary,
    Secondary,
}

/// A resolved routing target: which domain, which passage collection, and how much it counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainTarget {
    pub domain: Domain,
    /// Identifier of the passage collection (knowledge base) to search.
    pub collection_id: String,
    pub role: TargetRole,
}

impl DomainTarget {
    pub fn primary(domain: Domain, collection_id: impl Into<String>) -> Self {
        Self {
            domain,
            collection_id: collection_id.into(),
            role: TargetRole::Primary,
        }
    }

    pub fn secondary(domain: Domain, collection_id: impl Into<String>) -> Self {
        Self {
            domain,
            collection_id: collection_id.into(),
            role: TargetRole::Secondary,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.role == TargetRole::Primary
    }

    /// Relevance weight: primary targets count fully, secondary ones half.
    pub fn weight(&self) -> f64 {
        match self.role {
            TargetRole::Primary => 1.0,
            TargetRole::Secondary => 0.5,
        }
    }
}
