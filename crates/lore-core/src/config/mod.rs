pub mod defaults;

mod cache_config;
mod classifier_config;
mod domain_config;
mod learning_config;
mod observability_config;
mod oracle_config;
mod passage_store_config;
mod rerank_config;
mod retrieval_config;
mod session_config;
mod synthesis_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use cache_config::CacheConfig;
pub use classifier_config::{ClassifierConfig, SecondaryRule};
pub use domain_config::{DomainCatalog, DomainsConfig};
pub use learning_config::LearningConfig;
pub use observability_config::ObservabilityConfig;
pub use oracle_config::OracleConfig;
pub use passage_store_config::PassageStoreConfig;
pub use rerank_config::RerankConfig;
pub use retrieval_config::RetrievalConfig;
pub use session_config::SessionConfig;
pub use synthesis_config::SynthesisConfig;

use crate::constants::{MAX_EXPANSION_QUERIES, MAX_RERANK_CEILING, MIN_EXPANSION_QUERIES};
use crate::errors::ConfigError;

/// Top-level configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoreConfig {
    pub retrieval: RetrievalConfig,
    pub rerank: RerankConfig,
    pub synthesis: SynthesisConfig,
    pub oracle: OracleConfig,
    pub passage_store: PassageStoreConfig,
    pub cache: CacheConfig,
    pub domains: DomainsConfig,
    pub classifier: ClassifierConfig,
    pub learning: LearningConfig,
    pub session: SessionConfig,
    pub observability: ObservabilityConfig,
}

impl LoreConfig {
    /// Parse from a TOML string. Missing keys take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: LoreConfig = toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&raw)
    }

    /// Reject values the pipeline cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: String| {
            Err(ConfigError::Invalid {
                field: field.to_string(),
                reason,
            })
        };

        if self.retrieval.results_per_strategy == 0 {
            return invalid("retrieval.results_per_strategy", "must be at least 1".into());
        }
        if !(MIN_EXPANSION_QUERIES..=MAX_EXPANSION_QUERIES)
            .contains(&self.retrieval.expansion_queries)
        {
            return invalid(
                "retrieval.expansion_queries",
                format!("must be between {MIN_EXPANSION_QUERIES} and {MAX_EXPANSION_QUERIES}"),
            );
        }
        if self.retrieval.runner_timeout_ms == 0 {
            return invalid("retrieval.runner_timeout_ms", "must be positive".into());
        }
        if self.retrieval.request_timeout_ms < self.retrieval.runner_timeout_ms {
            return invalid(
                "retrieval.request_timeout_ms",
                "must be at least the runner timeout".into(),
            );
        }
        if self.oracle.timeout_ms == 0 {
            return invalid("oracle.timeout_ms", "must be positive".into());
        }
        if self.oracle.timeout_ms > self.retrieval.request_timeout_ms {
            return invalid(
                "oracle.timeout_ms",
                "must not exceed the request timeout".into(),
            );
        }
        if self.retrieval.strategies.is_empty() {
            return invalid("retrieval.strategies", "at least one strategy required".into());
        }
        if self.rerank.max_candidates == 0 || self.rerank.max_candidates > MAX_RERANK_CEILING {
            return invalid(
                "rerank.max_candidates",
                format!("must be between 1 and {MAX_RERANK_CEILING}"),
            );
        }
        if self.rerank.top_k == 0 {
            return invalid("rerank.top_k", "must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.rerank.min_relevance) {
            return invalid("rerank.min_relevance", "must be within [0, 1]".into());
        }
        if self.domains.default.database.trim().is_empty() {
            return invalid("domains.default.database", "collection id required".into());
        }
        for rule in &self.classifier.secondary_rules {
            if rule.primary == rule.secondary {
                return invalid(
                    "classifier.secondary_rules",
                    format!("{} cannot be its own secondary", rule.primary),
                );
            }
        }
        if self.session.channel_capacity == 0 {
            return invalid("session.channel_capacity", "must be at least 1".into());
        }
        Ok(())
    }
}
