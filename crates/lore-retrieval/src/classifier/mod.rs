//! Keyword classifier and target resolution.
//!
//! `classify` is a pure function of the query text and the keyword table.
//! `resolve` turns a classification (or an explicit mode) into concrete
//! collection targets using the application's domain catalog.

pub mod keywords;

use std::collections::BTreeMap;

use lore_core::config::{ClassifierConfig, DomainCatalog, SecondaryRule};
use lore_core::models::{Degradation, DegradationKind};
use lore_core::{Domain, DomainTarget, LoreError, LoreResult, QueryMode};

pub use keywords::{KeywordTable, DEFAULT_KEYWORDS};

/// Keyword scores for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub primary: Domain,
    pub scores: BTreeMap<Domain, usize>,
    /// True when no keyword matched and the fallback domain was chosen.
    pub defaulted: bool,
}

/// Targets for one request plus any degradation incurred choosing them.
#[derive(Debug, Clone)]
pub struct RoutingPlan {
    pub targets: Vec<DomainTarget>,
    pub classification: Option<Classification>,
    pub degradations: Vec<Degradation>,
}

impl RoutingPlan {
    pub fn primary(&self) -> Option<&DomainTarget> {
        self.targets.iter().find(|t| t.is_primary())
    }
}

pub struct DomainClassifier {
    table: &'static KeywordTable,
    secondary_rules: Vec<SecondaryRule>,
    fallback: Domain,
}

impl Default for DomainClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl DomainClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self::with_table(&DEFAULT_KEYWORDS, config)
    }

    pub fn with_table(table: &'static KeywordTable, config: &ClassifierConfig) -> Self {
        Self {
            table,
            secondary_rules: config.secondary_rules.clone(),
            fallback: config.fallback_domain,
        }
    }

    pub fn table_version(&self) -> u32 {
        self.table.version
    }

    /// Count keyword hits per domain. Ties go to the earlier domain in priority order.
    pub fn classify(&self, text: &str) -> Classification {
        let lowered = text.to_lowercase();
        let scores: BTreeMap<Domain, usize> = self
            .table
            .entries
            .iter()
            .map(|(domain, words)| {
                let hits = words.iter().filter(|w| lowered.contains(*w)).count();
                (*domain, hits)
            })
            .collect();

        let mut primary = self.fallback;
        let mut best = 0;
        for (domain, _) in &self.table.entries {
            let score = scores.get(domain).copied().unwrap_or(0);
            if score > best {
                best = score;
                primary = *domain;
            }
        }

        Classification {
            primary,
            scores,
            defaulted: best == 0,
        }
    }

    /// Secondary domains configured for `primary`, in rule order.
    pub fn secondaries_for(&self, primary: Domain) -> Vec<Domain> {
        let mut out = Vec::new();
        for rule in &self.secondary_rules {
            if rule.primary == primary && rule.secondary != primary && !out.contains(&rule.secondary)
            {
                out.push(rule.secondary);
            }
        }
        out
    }

    /// Resolve the ordered targets for a request.
    ///
    /// Explicit mode searches exactly the requested domain and fails with
    /// `NoTargets` if the catalog has no collection for it. Smart mode falls
    /// back to the database collection when the winning domain has none, and
    /// omits secondaries whose collection is absent.
    pub fn resolve(
        &self,
        text: &str,
        mode: QueryMode,
        catalog: &DomainCatalog,
    ) -> LoreResult<RoutingPlan> {
        match mode {
            QueryMode::Explicit(domain) => {
                let collection = catalog.collection(domain).ok_or_else(|| LoreError::NoTargets {
                    mode: mode.to_string(),
                })?;
                Ok(RoutingPlan {
                    targets: vec![DomainTarget::primary(domain, collection)],
                    classification: None,
                    degradations: Vec::new(),
                })
            }
            QueryMode::Smart => {
                let classification = self.classify(text);
                let mut degradations = Vec::new();
                if classification.defaulted {
                    degradations.push(Degradation::new(
                        DegradationKind::ClassificationDefault,
                        "classifier",
                        "no domain keywords matched",
                        format!("{} domain", self.fallback),
                    ));
                }

                let (primary, collection) = match catalog.collection(classification.primary) {
                    Some(collection) => (classification.primary, collection),
                    None => (Domain::Database, catalog.database.as_str()),
                };
                let mut targets = vec![DomainTarget::primary(primary, collection)];
                for secondary in self.secondaries_for(primary) {
                    if let Some(collection) = catalog.collection(secondary) {
                        targets.push(DomainTarget::secondary(secondary, collection));
                    }
                }

                lore_observability::tracing_setup::events::query_routed(
                    text,
                    primary.as_str(),
                    targets.len(),
                    classification.defaulted,
                );
                Ok(RoutingPlan {
                    targets,
                    classification: Some(classification),
                    degradations,
                })
            }
        }
    }
}
