use serde::{Deserialize, Serialize};

use crate::domain::Domain;

/// When `primary` wins smart routing, also search `secondary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryRule {
    pub primary: Domain,
    pub secondary: Domain,
}

/// Classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Secondary-target rules for smart mode. Default: database → support.
    pub secondary_rules: Vec<SecondaryRule>,
    /// Domain chosen when no keyword matches.
    pub fallback_domain: Domain,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            secondary_rules: vec![SecondaryRule {
                primary: Domain::Database,
                secondary: Domain::Support,
            }],
            fallback_domain: Domain::Database,
        }
    }
}
