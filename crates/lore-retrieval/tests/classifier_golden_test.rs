use proptest::prelude::*;

use lore_core::config::DomainCatalog;
use lore_core::QueryMode;
use lore_retrieval::DomainClassifier;
use test_fixtures::classifier_cases;

#[test]
fn golden_queries_route_as_expected() {
    let classifier = DomainClassifier::default();
    let catalog = DomainCatalog::default();

    for case in classifier_cases() {
        let plan = classifier
            .resolve(&case.query, QueryMode::Smart, &catalog)
            .unwrap();
        let primary = plan.primary().unwrap();
        assert_eq!(primary.domain, case.primary, "primary for {:?}", case.query);

        let secondaries: Vec<_> = plan
            .targets
            .iter()
            .filter(|t| !t.is_primary())
            .map(|t| t.domain)
            .collect();
        assert_eq!(secondaries, case.secondaries, "secondaries for {:?}", case.query);
    }
}

#[test]
fn unmatched_query_carries_a_classification_degradation() {
    let plan = DomainClassifier::default()
        .resolve("good afternoon", QueryMode::Smart, &DomainCatalog::default())
        .unwrap();
    assert_eq!(plan.degradations.len(), 1);
    assert_eq!(plan.degradations[0].component, "classifier");
}

proptest! {
    #[test]
    fn classification_is_deterministic(text in ".{0,80}") {
        let classifier = DomainClassifier::default();
        prop_assert_eq!(classifier.classify(&text), classifier.classify(&text));
    }

    #[test]
    fn classification_ignores_case(text in "[a-zA-Z ]{0,60}") {
        let classifier = DomainClassifier::default();
        prop_assert_eq!(
            classifier.classify(&text).primary,
            classifier.classify(&text.to_uppercase()).primary
        );
    }
}
