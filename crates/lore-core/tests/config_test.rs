use lore_core::config::*;
use lore_core::{Domain, StrategyKind};
use lore_core::errors::ConfigError;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = LoreConfig::from_toml("").unwrap();

    // Retrieval defaults
    assert_eq!(config.retrieval.results_per_strategy, 5);
    assert_eq!(config.retrieval.expansion_queries, 4);
    assert_eq!(config.retrieval.runner_timeout_ms, 4_000);
    assert_eq!(config.retrieval.request_timeout_ms, 12_000);
    assert_eq!(config.retrieval.strategies, StrategyKind::ALL.to_vec());

    // Rerank defaults
    assert!(config.rerank.enabled);
    assert_eq!(config.rerank.max_candidates, 20);
    assert_eq!(config.rerank.top_k, 5);
    assert_eq!(config.rerank.min_relevance, 0.0);

    // Synthesis defaults
    assert_eq!(config.synthesis.max_tokens, 4_000);
    assert_eq!(config.synthesis.temperature, 0.2);

    // Oracle defaults
    assert_eq!(config.oracle.expansion_temperature, 0.7);
    assert_eq!(config.oracle.api_key_env, "LORE_API_KEY");
    assert!(config.oracle.timeout_ms <= config.retrieval.request_timeout_ms);

    // Cache defaults
    assert!(config.cache.enabled);
    assert_eq!(config.cache.ttl_secs, 3_600);

    // Classifier defaults: database pulls in support
    assert_eq!(
        config.classifier.secondary_rules,
        vec![SecondaryRule {
            primary: Domain::Database,
            secondary: Domain::Support
        }]
    );
    assert_eq!(config.classifier.fallback_domain, Domain::Database);

    // Learning defaults
    assert_eq!(config.learning.max_retries, 3);
    assert_eq!(config.learning.default_weight, 1.0);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
    assert!(!config.observability.json_logs);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[retrieval]
expansion_queries = 5
strategies = ["standard", "hyde"]

[rerank]
top_k = 3
"#;
    let config = LoreConfig::from_toml(toml).unwrap();
    assert_eq!(config.retrieval.expansion_queries, 5);
    assert_eq!(
        config.retrieval.strategies,
        vec![StrategyKind::Standard, StrategyKind::Hyde]
    );
    assert_eq!(config.rerank.top_k, 3);
    // Non-overridden fields keep defaults
    assert_eq!(config.retrieval.results_per_strategy, 5);
    assert_eq!(config.rerank.max_candidates, 20);
}

#[test]
fn per_application_catalog_overrides_default() {
    let toml = r#"
[domains.default]
database = "db-main"

[domains.applications.billing]
database = "db-billing"
documentation = "docs-billing"
"#;
    let config = LoreConfig::from_toml(toml).unwrap();
    let default = config.domains.catalog_for(None);
    assert_eq!(default.collection(Domain::Database), Some("db-main"));
    assert_eq!(default.collection(Domain::Support), None);

    let billing = config.domains.catalog_for(Some("billing"));
    assert_eq!(billing.collection(Domain::Database), Some("db-billing"));
    assert_eq!(billing.collection(Domain::Support), None);
    assert_eq!(billing.collection(Domain::Documentation), Some("docs-billing"));

    // Unknown applications fall back to the default catalog.
    assert_eq!(config.domains.catalog_for(Some("crm")), default);
}

#[test]
fn expansion_queries_out_of_range_is_rejected() {
    let err = LoreConfig::from_toml("[retrieval]\nexpansion_queries = 9\n").unwrap_err();
    assert!(err.to_string().contains("retrieval.expansion_queries"));
}

#[test]
fn self_referencing_secondary_rule_is_rejected() {
    let toml = r#"
[[classifier.secondary_rules]]
primary = "support"
secondary = "support"
"#;
    assert!(LoreConfig::from_toml(toml).is_err());
}

#[test]
fn request_timeout_shorter_than_runner_timeout_is_rejected() {
    let toml = "[retrieval]\nrunner_timeout_ms = 5000\nrequest_timeout_ms = 1000\n";
    assert!(LoreConfig::from_toml(toml).is_err());
}

#[test]
fn oracle_timeout_longer_than_request_timeout_is_rejected() {
    let toml = "[retrieval]\nrequest_timeout_ms = 5000\n\n[oracle]\ntimeout_ms = 30000\n";
    let err = LoreConfig::from_toml(toml).unwrap_err();
    assert!(err.to_string().contains("oracle.timeout_ms"));

    let toml = "[retrieval]\nrequest_timeout_ms = 5000\n\n[oracle]\ntimeout_ms = 5000\n";
    assert!(LoreConfig::from_toml(toml).is_ok());
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = LoreConfig::from_toml("[retrieval\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = LoreConfig::from_file(std::path::Path::new("/nonexistent/lore.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn config_roundtrips_through_toml() {
    let config = LoreConfig::default();
    let serialized = toml::to_string(&config).unwrap();
    let back = LoreConfig::from_toml(&serialized).unwrap();
    assert_eq!(back.rerank.top_k, config.rerank.top_k);
    assert_eq!(back.domains.default, config.domains.default);
}
