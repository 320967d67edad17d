//! Feedback loop: corrections → examples → improvement → completion, plus hints.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lore_core::config::{DomainCatalog, LearningConfig};
use lore_core::errors::{FeedbackError, PassageStoreError};
use lore_core::models::{
    CorrectionRecord, CorrectionStatus, ErrorDetails, FeedbackScope, ImprovementMetrics,
    ImprovementPatch, ImprovementRecord, ImprovementStatus, TrainingExample, ValidationStatus,
};
use lore_core::traits::{ICorrectionHints, IFeedbackStore};
use lore_core::{Domain, LoreError, LoreResult};
use lore_learning::{
    validate_correction, CorrectionHintProvider, FeedbackGeneralizer, RetryPolicy,
};
use lore_storage::{MemoryFeedbackStore, SqliteFeedbackStore};
use test_fixtures::{correction, correction_cases, RecordingIngestor};

const TENANT: &str = "acme";
const COLLECTION: &str = "database-kb";

fn scope() -> FeedbackScope {
    FeedbackScope::new(TENANT, COLLECTION)
}

fn seed(store: &dyn IFeedbackStore) -> Vec<String> {
    correction_cases()
        .iter()
        .map(|case| {
            let record = case.to_record(TENANT, COLLECTION);
            store.insert_correction(&record).unwrap();
            record.id
        })
        .collect()
}

fn generalizer(
    store: Arc<dyn IFeedbackStore>,
    ingestor: Arc<RecordingIngestor>,
) -> FeedbackGeneralizer {
    FeedbackGeneralizer::new(store, &LearningConfig::default())
        .with_ingestor(ingestor)
        .with_retry(RetryPolicy::none())
}

#[tokio::test]
async fn process_generalizes_and_submits_documents() {
    let store = Arc::new(MemoryFeedbackStore::new());
    let ids = seed(store.as_ref());
    let ingestor = Arc::new(RecordingIngestor::new());
    let engine = generalizer(store.clone(), ingestor.clone());

    let report = engine.process(&scope(), false).await.unwrap();
    assert_eq!(report.processed(), 3);

    let mut patterns: Vec<_> = report.examples.iter().map(|e| e.query_pattern.clone()).collect();
    patterns.sort();
    let mut expected: Vec<_> = correction_cases().into_iter().map(|c| c.expected_pattern).collect();
    expected.sort();
    assert_eq!(patterns, expected);

    for id in &ids {
        let record = store.get_correction(id).unwrap().unwrap();
        assert_eq!(record.status, CorrectionStatus::Reviewed);
    }

    let improvement = report.improvement.unwrap();
    assert_eq!(improvement.status, ImprovementStatus::InProgress);
    assert_eq!(improvement.ingestion_job_id.as_deref(), Some("job-1"));
    assert_eq!(improvement.description, "Processed 3 user corrections");
    assert_eq!(improvement.training_example_ids.len(), 3);

    let submissions = ingestor.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].0, COLLECTION);
    assert!(submissions[0]
        .1
        .iter()
        .all(|doc| doc.category == "user_corrections"));
}

#[tokio::test]
async fn examples_are_weighted_by_category() {
    let store = Arc::new(MemoryFeedbackStore::new());
    seed(store.as_ref());
    let engine = generalizer(store.clone(), Arc::new(RecordingIngestor::new()));

    let report = engine.process(&scope(), false).await.unwrap();
    let examples = store.training_examples(&scope(), None).unwrap();
    assert_eq!(examples.len(), report.processed());
    // weight DESC: incorrect_sql (1.5) before wrong_table (1.3) before missing (1.2)
    let weights: Vec<f64> = examples.iter().map(|e| e.weight).collect();
    assert!(weights.windows(2).all(|w| w[0] >= w[1]));
    assert!((weights[0] - 1.5).abs() < 1e-9);
}

#[tokio::test]
async fn processing_twice_is_idempotent() {
    let store = Arc::new(SqliteFeedbackStore::open_in_memory().unwrap());
    seed(store.as_ref());
    let ingestor = Arc::new(RecordingIngestor::new());
    let engine = generalizer(store.clone(), ingestor.clone());

    let first = engine.process(&scope(), false).await.unwrap();
    let second = engine.process(&scope(), false).await.unwrap();

    assert_eq!(first.processed(), 3);
    assert_eq!(second.processed(), 0);
    assert!(second.improvement.is_none());
    assert_eq!(store.training_examples(&scope(), None).unwrap().len(), 3);
    assert_eq!(ingestor.submissions().len(), 1);
}

#[tokio::test]
async fn reprocessing_records_skips_existing_examples() {
    let store = Arc::new(MemoryFeedbackStore::new());
    let record = correction(TENANT, COLLECTION, "how many invoices?", "Count invoices.id");
    store.insert_correction(&record).unwrap();
    let engine = generalizer(store.clone(), Arc::new(RecordingIngestor::new()));

    let first = engine
        .process_records(&scope(), std::slice::from_ref(&record), false)
        .await
        .unwrap();
    assert_eq!(first.processed(), 1);

    // a stale copy of the same pending record
    let again = engine
        .process_records(&scope(), &[record.clone()], false)
        .await
        .unwrap();
    assert_eq!(again.processed(), 0);
    assert_eq!(again.skipped, vec![record.id.clone()]);
    assert_eq!(store.training_examples(&scope(), None).unwrap().len(), 1);
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let store = Arc::new(MemoryFeedbackStore::new());
    let ids = seed(store.as_ref());
    let ingestor = Arc::new(RecordingIngestor::new());
    let engine = generalizer(store.clone(), ingestor.clone());

    let report = engine.process(&scope(), true).await.unwrap();
    assert!(report.dry_run);
    assert_eq!(report.processed(), 3);
    assert!(report.improvement.is_none());
    assert!(store.training_examples(&scope(), None).unwrap().is_empty());
    assert!(ingestor.submissions().is_empty());
    for id in &ids {
        assert_eq!(
            store.get_correction(id).unwrap().unwrap().status,
            CorrectionStatus::Pending
        );
    }
}

#[tokio::test]
async fn empty_corrected_response_is_rejected() {
    let store = Arc::new(MemoryFeedbackStore::new());
    let record = correction(TENANT, COLLECTION, "list customers", "   ");
    store.insert_correction(&record).unwrap();
    let engine = generalizer(store.clone(), Arc::new(RecordingIngestor::new()));

    let report = engine.process(&scope(), false).await.unwrap();
    assert_eq!(report.rejected, vec![record.id.clone()]);
    assert_eq!(report.processed(), 0);
    assert_eq!(
        store.get_correction(&record.id).unwrap().unwrap().status,
        CorrectionStatus::Rejected
    );
}

#[tokio::test]
async fn blank_query_text_is_rejected_with_its_reason() {
    let store = Arc::new(MemoryFeedbackStore::new());
    let record = correction(TENANT, COLLECTION, "  ", "SELECT * FROM customers");
    store.insert_correction(&record).unwrap();

    let err = validate_correction(&record).unwrap_err();
    assert!(
        matches!(&err, LoreError::FeedbackValidationRejected { record_id, reason }
            if record_id == &record.id && reason == "query text is empty")
    );
    assert!(err.to_string().contains(&record.id));

    let engine = generalizer(store.clone(), Arc::new(RecordingIngestor::new()));
    let report = engine.process(&scope(), true).await.unwrap();
    assert_eq!(report.rejected, vec![record.id.clone()]);
    // dry runs leave the record pending
    assert_eq!(
        store.get_correction(&record.id).unwrap().unwrap().status,
        CorrectionStatus::Pending
    );
}

#[tokio::test]
async fn other_scopes_are_untouched() {
    let store = Arc::new(MemoryFeedbackStore::new());
    let foreign = correction("globex", COLLECTION, "list customers", "SELECT * FROM customers");
    store.insert_correction(&foreign).unwrap();
    let engine = generalizer(store.clone(), Arc::new(RecordingIngestor::new()));

    let report = engine.process(&scope(), false).await.unwrap();
    assert_eq!(report.processed(), 0);
    assert_eq!(
        store.get_correction(&foreign.id).unwrap().unwrap().status,
        CorrectionStatus::Pending
    );
}

#[tokio::test]
async fn ingestion_failure_fails_the_improvement() {
    let store = Arc::new(MemoryFeedbackStore::new());
    seed(store.as_ref());
    let ingestor = Arc::new(RecordingIngestor::failing(PassageStoreError::Unavailable {
        reason: "ingestion offline".into(),
    }));
    let engine = generalizer(store.clone(), ingestor);

    let report = engine.process(&scope(), false).await.unwrap();
    let improvement = report.improvement.unwrap();
    assert_eq!(improvement.status, ImprovementStatus::Failed);
    let error = improvement.error.unwrap();
    assert_eq!(error.stage, "ingestion");
    assert!(error.message.contains("ingestion offline"));
}

#[tokio::test]
async fn without_ingestor_improvement_stays_planned_until_submitted() {
    let store = Arc::new(MemoryFeedbackStore::new());
    seed(store.as_ref());
    let engine = FeedbackGeneralizer::new(store.clone(), &LearningConfig::default());

    let report = engine.process(&scope(), false).await.unwrap();
    let planned = report.improvement.unwrap();
    assert_eq!(planned.status, ImprovementStatus::Planned);

    let ingestor = Arc::new(RecordingIngestor::new());
    let engine = engine.with_ingestor(ingestor.clone());
    let submitted = engine.submit_planned(&planned.id).await.unwrap();
    assert_eq!(submitted.status, ImprovementStatus::InProgress);
    assert_eq!(ingestor.submissions()[0].1.len(), 3);
}

#[tokio::test]
async fn complete_requires_a_validated_example() {
    let store = Arc::new(MemoryFeedbackStore::new());
    seed(store.as_ref());
    let engine = generalizer(store.clone(), Arc::new(RecordingIngestor::new()));
    let report = engine.process(&scope(), false).await.unwrap();
    let improvement = report.improvement.unwrap();

    let err = engine
        .complete(&improvement.id, ImprovementMetrics::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LoreError::FeedbackError(FeedbackError::InvariantViolation { .. })
    ));
    assert_eq!(
        store.get_improvement(&improvement.id).unwrap().unwrap().status,
        ImprovementStatus::InProgress
    );
}

#[tokio::test]
async fn complete_applies_validated_corrections_only() {
    let store = Arc::new(MemoryFeedbackStore::new());
    seed(store.as_ref());
    let engine = generalizer(store.clone(), Arc::new(RecordingIngestor::new()));
    let report = engine.process(&scope(), false).await.unwrap();
    let improvement = report.improvement.unwrap();

    let validated = &report.examples[0];
    let rejected = &report.examples[1];
    engine.validate_example(&validated.id).await.unwrap();
    engine.reject_example(&rejected.id).await.unwrap();

    let completed = engine
        .complete(
            &improvement.id,
            ImprovementMetrics {
                documents_submitted: 3,
                documents_indexed: 3,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(completed.status, ImprovementStatus::Completed);
    assert_eq!(completed.metrics.unwrap().corrections_applied, 1);

    let status_of = |correction_id: &str| store.get_correction(correction_id).unwrap().unwrap().status;
    assert_eq!(status_of(&validated.correction_id), CorrectionStatus::Applied);
    assert_eq!(status_of(&rejected.correction_id), CorrectionStatus::Reviewed);

    let again = engine
        .fail(&improvement.id, ErrorDetails::new("manual", "too late"))
        .await
        .unwrap_err();
    assert!(matches!(again, LoreError::FeedbackError(_)));
}

#[tokio::test]
async fn fail_keeps_error_details() {
    let store = Arc::new(MemoryFeedbackStore::new());
    seed(store.as_ref());
    let engine = generalizer(store.clone(), Arc::new(RecordingIngestor::new()));
    let improvement = engine.process(&scope(), false).await.unwrap().improvement.unwrap();

    let failed = engine
        .fail(&improvement.id, ErrorDetails::new("indexing", "job crashed"))
        .await
        .unwrap();
    assert_eq!(failed.status, ImprovementStatus::Failed);
    assert_eq!(failed.error.unwrap().message, "job crashed");
}

#[tokio::test]
async fn reviewer_operations() {
    let store = Arc::new(MemoryFeedbackStore::new());
    let keep = correction(TENANT, COLLECTION, "list vendors", "SELECT * FROM vendors");
    let off_topic = correction(TENANT, COLLECTION, "list planets", "n/a");
    store.insert_correction(&keep).unwrap();
    store.insert_correction(&off_topic).unwrap();
    let engine = FeedbackGeneralizer::new(store.clone(), &LearningConfig::default());

    let rejected = engine.reject_correction(&off_topic.id, "off topic").await.unwrap();
    assert_eq!(rejected.status, CorrectionStatus::Rejected);
    assert!(engine.reject_correction(&off_topic.id, "again").await.is_err());

    let report = engine.process(&scope(), false).await.unwrap();
    assert_eq!(report.processed(), 1);
    let example = &report.examples[0];

    let reweighted = engine.set_weight(&example.id, 2.5).await.unwrap();
    assert_eq!(reweighted.weight, 2.5);
    assert!(engine.set_weight(&example.id, -1.0).await.is_err());
    assert!(engine.set_weight(&example.id, f64::NAN).await.is_err());

    let validated = engine.validate_example(&example.id).await.unwrap();
    assert_eq!(validated.validation_status, ValidationStatus::Validated);
    assert!(engine.reject_example(&example.id).await.is_err());

    let missing = engine.validate_example("nope").await.unwrap_err();
    assert!(matches!(
        missing,
        LoreError::FeedbackError(FeedbackError::NotFound { .. })
    ));
}

#[tokio::test]
async fn hints_serve_validated_examples_and_count_usage() {
    let store = Arc::new(MemoryFeedbackStore::new());
    seed(store.as_ref());
    let engine = generalizer(store.clone(), Arc::new(RecordingIngestor::new()));
    let report = engine.process(&scope(), false).await.unwrap();

    let hints = CorrectionHintProvider::new(store.clone(), TENANT, DomainCatalog::default());
    let query = "Which columns are in table shipments?";
    assert!(hints.hints_for(query, Domain::Database, 3).await.is_empty());

    let example = report
        .examples
        .iter()
        .find(|e| e.query_pattern == "which columns are in table [TABLE]?")
        .unwrap();
    engine.validate_example(&example.id).await.unwrap();

    let served = hints.hints_for(query, Domain::Database, 3).await;
    assert_eq!(served.len(), 1);
    assert_eq!(served[0].example_id, example.id);
    assert!(served[0].correct_response.contains("invoice_lines"));
    assert_eq!(
        store.get_training_example(&example.id).unwrap().unwrap().usage_count,
        1
    );

    assert!(hints.hints_for(query, Domain::Support, 3).await.is_empty());
    assert!(hints.hints_for(query, Domain::Database, 0).await.is_empty());
    let other_tenant = CorrectionHintProvider::new(store.clone(), "globex", DomainCatalog::default());
    assert!(other_tenant.hints_for(query, Domain::Database, 3).await.is_empty());
}

/// Delegates to a memory store but stalls the thread on example reads.
struct SlowExampleStore {
    inner: MemoryFeedbackStore,
    delay: Duration,
}

impl IFeedbackStore for SlowExampleStore {
    fn insert_correction(&self, record: &CorrectionRecord) -> LoreResult<()> {
        self.inner.insert_correction(record)
    }
    fn get_correction(&self, id: &str) -> LoreResult<Option<CorrectionRecord>> {
        self.inner.get_correction(id)
    }
    fn corrections_by_status(
        &self,
        scope: &FeedbackScope,
        status: CorrectionStatus,
    ) -> LoreResult<Vec<CorrectionRecord>> {
        self.inner.corrections_by_status(scope, status)
    }
    fn transition_correction(
        &self,
        id: &str,
        expected: CorrectionStatus,
        next: CorrectionStatus,
    ) -> LoreResult<bool> {
        self.inner.transition_correction(id, expected, next)
    }
    fn insert_training_example_if_absent(
        &self,
        example: &TrainingExample,
    ) -> LoreResult<(TrainingExample, bool)> {
        self.inner.insert_training_example_if_absent(example)
    }
    fn get_training_example(&self, id: &str) -> LoreResult<Option<TrainingExample>> {
        self.inner.get_training_example(id)
    }
    fn training_example_for_correction(
        &self,
        correction_id: &str,
    ) -> LoreResult<Option<TrainingExample>> {
        self.inner.training_example_for_correction(correction_id)
    }
    fn training_examples(
        &self,
        scope: &FeedbackScope,
        status: Option<ValidationStatus>,
    ) -> LoreResult<Vec<TrainingExample>> {
        std::thread::sleep(self.delay);
        self.inner.training_examples(scope, status)
    }
    fn transition_training_example(
        &self,
        id: &str,
        expected: ValidationStatus,
        next: ValidationStatus,
    ) -> LoreResult<bool> {
        self.inner.transition_training_example(id, expected, next)
    }
    fn update_training_weight(&self, id: &str, weight: f64) -> LoreResult<()> {
        self.inner.update_training_weight(id, weight)
    }
    fn increment_usage(&self, id: &str) -> LoreResult<()> {
        self.inner.increment_usage(id)
    }
    fn insert_improvement(&self, record: &ImprovementRecord) -> LoreResult<()> {
        self.inner.insert_improvement(record)
    }
    fn get_improvement(&self, id: &str) -> LoreResult<Option<ImprovementRecord>> {
        self.inner.get_improvement(id)
    }
    fn transition_improvement(
        &self,
        id: &str,
        expected: ImprovementStatus,
        next: ImprovementStatus,
        patch: &ImprovementPatch,
    ) -> LoreResult<bool> {
        self.inner.transition_improvement(id, expected, next, patch)
    }
}

#[tokio::test]
async fn slow_hint_lookup_does_not_stall_the_runtime() {
    let store = Arc::new(SlowExampleStore {
        inner: MemoryFeedbackStore::new(),
        delay: Duration::from_millis(300),
    });
    let hints = CorrectionHintProvider::new(store, TENANT, DomainCatalog::default());

    let lookup = async {
        let served = hints.hints_for("list customers", Domain::Database, 3).await;
        (served, Instant::now())
    };
    let ticker = async {
        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Instant::now()
    };
    let ((served, lookup_done), ticks_done) = tokio::join!(lookup, ticker);

    assert!(served.is_empty());
    assert!(ticks_done < lookup_done, "ticker was starved by the hint lookup");
}
