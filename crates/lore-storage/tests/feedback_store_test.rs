//! Behavior shared by both IFeedbackStore backends.

use chrono::Utc;

use lore_core::errors::LoreError;
use lore_core::models::*;
use lore_core::traits::IFeedbackStore;
use lore_storage::{MemoryFeedbackStore, SqliteFeedbackStore};
use test_fixtures::correction;

fn backends() -> Vec<(&'static str, Box<dyn IFeedbackStore>)> {
    vec![
        ("memory", Box::new(MemoryFeedbackStore::new())),
        (
            "sqlite",
            Box::new(SqliteFeedbackStore::open_in_memory().unwrap()),
        ),
    ]
}

fn example_for(record: &CorrectionRecord, weight: f64) -> TrainingExample {
    TrainingExample {
        id: format!("ex-{}", record.id),
        correction_id: record.id.clone(),
        tenant_id: record.tenant_id.clone(),
        domain_id: record.domain_id.clone(),
        query_pattern: record.query_text.to_lowercase(),
        correct_response: record.corrected_response.clone(),
        incorrect_response: record.incorrect_response.clone(),
        notes: record.notes.clone(),
        weight,
        validation_status: ValidationStatus::Pending,
        usage_count: 0,
        created_at: Utc::now(),
    }
}

fn planned_improvement(id: &str) -> ImprovementRecord {
    let now = Utc::now();
    ImprovementRecord {
        id: id.to_string(),
        tenant_id: "acme".into(),
        domain_id: "db".into(),
        kind: "content_update".into(),
        description: "Processed 1 user corrections".into(),
        training_example_ids: vec!["ex-1".into()],
        method: ImplementationMethod::IngestionJob,
        status: ImprovementStatus::Planned,
        ingestion_job_id: None,
        metrics: None,
        error: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn correction_roundtrip_and_scope_filter() {
    for (name, store) in backends() {
        let mine = correction("acme", "db", "Which table holds orders?", "sales_orders");
        let other = correction("globex", "db", "Which table holds orders?", "orders");
        store.insert_correction(&mine).unwrap();
        store.insert_correction(&other).unwrap();

        let loaded = store.get_correction(&mine.id).unwrap().unwrap();
        assert_eq!(loaded.query_text, mine.query_text, "{name}");
        assert_eq!(loaded.status, CorrectionStatus::Pending, "{name}");

        let scope = FeedbackScope::new("acme", "db");
        let pending = store
            .corrections_by_status(&scope, CorrectionStatus::Pending)
            .unwrap();
        assert_eq!(pending.len(), 1, "{name}");
        assert_eq!(pending[0].id, mine.id, "{name}");
    }
}

#[test]
fn correction_cas_only_succeeds_from_expected_status() {
    for (name, store) in backends() {
        let record = correction("acme", "db", "q", "a");
        store.insert_correction(&record).unwrap();

        assert!(store
            .transition_correction(&record.id, CorrectionStatus::Pending, CorrectionStatus::Reviewed)
            .unwrap(), "{name}");
        // Second attempt from the stale status loses.
        assert!(!store
            .transition_correction(&record.id, CorrectionStatus::Pending, CorrectionStatus::Reviewed)
            .unwrap(), "{name}");

        let loaded = store.get_correction(&record.id).unwrap().unwrap();
        assert_eq!(loaded.status, CorrectionStatus::Reviewed, "{name}");
        assert!(loaded.processed_at.is_some(), "{name}");
    }
}

#[test]
fn illegal_correction_transition_is_an_error() {
    for (name, store) in backends() {
        let record = correction("acme", "db", "q", "a");
        store.insert_correction(&record).unwrap();
        let err = store
            .transition_correction(&record.id, CorrectionStatus::Pending, CorrectionStatus::Applied)
            .unwrap_err();
        assert!(matches!(err, LoreError::FeedbackError(_)), "{name}");
    }
}

#[test]
fn training_example_is_unique_per_correction() {
    for (name, store) in backends() {
        let record = correction("acme", "db", "q", "a");
        store.insert_correction(&record).unwrap();

        let first = example_for(&record, 1.0);
        let (stored, created) = store.insert_training_example_if_absent(&first).unwrap();
        assert!(created, "{name}");
        assert_eq!(stored.id, first.id, "{name}");

        let mut duplicate = example_for(&record, 2.0);
        duplicate.id = "ex-duplicate".into();
        let (stored, created) = store.insert_training_example_if_absent(&duplicate).unwrap();
        assert!(!created, "{name}");
        assert_eq!(stored.id, first.id, "{name}");

        let scope = FeedbackScope::new("acme", "db");
        assert_eq!(store.training_examples(&scope, None).unwrap().len(), 1, "{name}");
        assert_eq!(
            store
                .training_example_for_correction(&record.id)
                .unwrap()
                .unwrap()
                .id,
            first.id,
            "{name}"
        );
    }
}

#[test]
fn training_examples_filter_by_validation_and_order_by_weight() {
    for (name, store) in backends() {
        let light = correction("acme", "db", "light", "a");
        let heavy = correction("acme", "db", "heavy", "b");
        store.insert_correction(&light).unwrap();
        store.insert_correction(&heavy).unwrap();
        store.insert_training_example_if_absent(&example_for(&light, 0.5)).unwrap();
        store.insert_training_example_if_absent(&example_for(&heavy, 1.5)).unwrap();

        let scope = FeedbackScope::new("acme", "db");
        let all = store.training_examples(&scope, None).unwrap();
        assert_eq!(all[0].correction_id, heavy.id, "{name}");

        let heavy_id = format!("ex-{}", heavy.id);
        assert!(store
            .transition_training_example(&heavy_id, ValidationStatus::Pending, ValidationStatus::Validated)
            .unwrap(), "{name}");
        let validated = store
            .training_examples(&scope, Some(ValidationStatus::Validated))
            .unwrap();
        assert_eq!(validated.len(), 1, "{name}");
        assert!(validated[0].is_validated(), "{name}");

        store.update_training_weight(&heavy_id, 0.1).unwrap();
        store.increment_usage(&heavy_id).unwrap();
        store.increment_usage(&heavy_id).unwrap();
        let loaded = store.get_training_example(&heavy_id).unwrap().unwrap();
        assert_eq!(loaded.weight, 0.1, "{name}");
        assert_eq!(loaded.usage_count, 2, "{name}");

        assert!(store.increment_usage("ex-missing").is_err(), "{name}");
    }
}

#[test]
fn improvement_lifecycle_persists_patch_fields() {
    for (name, store) in backends() {
        store.insert_improvement(&planned_improvement("imp-1")).unwrap();

        let patch = ImprovementPatch {
            ingestion_job_id: Some("job-9".into()),
            ..Default::default()
        };
        assert!(store
            .transition_improvement("imp-1", ImprovementStatus::Planned, ImprovementStatus::InProgress, &patch)
            .unwrap(), "{name}");

        let metrics = ImprovementMetrics {
            documents_submitted: 1,
            documents_indexed: 1,
            corrections_applied: 1,
        };
        let patch = ImprovementPatch {
            metrics: Some(metrics.clone()),
            ..Default::default()
        };
        assert!(store
            .transition_improvement("imp-1", ImprovementStatus::InProgress, ImprovementStatus::Completed, &patch)
            .unwrap(), "{name}");

        let loaded = store.get_improvement("imp-1").unwrap().unwrap();
        assert_eq!(loaded.status, ImprovementStatus::Completed, "{name}");
        assert_eq!(loaded.ingestion_job_id.as_deref(), Some("job-9"), "{name}");
        assert_eq!(loaded.metrics, Some(metrics), "{name}");

        // Terminal: nothing leaves completed.
        assert!(store
            .transition_improvement("imp-1", ImprovementStatus::Completed, ImprovementStatus::Failed, &ImprovementPatch::default())
            .is_err(), "{name}");
    }
}

#[test]
fn failing_an_improvement_requires_error_details() {
    for (name, store) in backends() {
        store.insert_improvement(&planned_improvement("imp-2")).unwrap();
        assert!(store
            .transition_improvement("imp-2", ImprovementStatus::Planned, ImprovementStatus::Failed, &ImprovementPatch::default())
            .is_err(), "{name}");

        let patch = ImprovementPatch {
            error: Some(ErrorDetails::new("ingestion", "store rejected batch")),
            ..Default::default()
        };
        assert!(store
            .transition_improvement("imp-2", ImprovementStatus::Planned, ImprovementStatus::Failed, &patch)
            .unwrap(), "{name}");
        let loaded = store.get_improvement("imp-2").unwrap().unwrap();
        assert_eq!(loaded.error.unwrap().stage, "ingestion", "{name}");
    }
}

#[test]
fn missing_improvement_transition_returns_false() {
    for (name, store) in backends() {
        assert!(!store
            .transition_improvement("nope", ImprovementStatus::Planned, ImprovementStatus::InProgress, &ImprovementPatch::default())
            .unwrap(), "{name}");
    }
}
