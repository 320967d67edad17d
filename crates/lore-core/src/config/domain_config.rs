use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::domain::Domain;

/// Passage collections available to one application.
///
/// The database collection is mandatory; support and documentation are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCatalog {
    pub database: String,
    #[serde(default)]
    pub support: Option<String>,
    #[serde(default)]
    pub documentation: Option<String>,
}

impl DomainCatalog {
    pub fn collection(&self, domain: Domain) -> Option<&str> {
        match domain {
            Domain::Database => Some(self.database.as_str()),
            Domain::Support => self.support.as_deref(),
            Domain::Documentation => self.documentation.as_deref(),
        }
    }
}

impl Default for DomainCatalog {
    fn default() -> Self {
        Self {
            database: defaults::DEFAULT_DATABASE_COLLECTION.to_string(),
            support: Some(defaults::DEFAULT_SUPPORT_COLLECTION.to_string()),
            documentation: Some(defaults::DEFAULT_DOCUMENTATION_COLLECTION.to_string()),
        }
    }
}

/// Domain catalogs: a default plus per-application overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainsConfig {
    pub default: DomainCatalog,
    pub applications: BTreeMap<String, DomainCatalog>,
}

impl DomainsConfig {
    /// Catalog for `application`, falling back to the default catalog.
    pub fn catalog_for(&self, application: Option<&str>) -> &DomainCatalog {
        application
            .and_then(|name| self.applications.get(name))
            .unwrap_or(&self.default)
    }
}
