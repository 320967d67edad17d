use lore_core::models::{CorrectionStatus, FeedbackScope};
use lore_core::traits::IFeedbackStore;
use lore_storage::migrations::LATEST_VERSION;
use lore_storage::SqliteFeedbackStore;
use test_fixtures::correction;

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feedback.db");

    let record = correction("acme", "db", "Which table stores invoices?", "invoices");
    {
        let store = SqliteFeedbackStore::open(&path).unwrap();
        store.insert_correction(&record).unwrap();
        store
            .transition_correction(&record.id, CorrectionStatus::Pending, CorrectionStatus::Reviewed)
            .unwrap();
    }

    let store = SqliteFeedbackStore::open(&path).unwrap();
    assert_eq!(store.schema_version().unwrap(), LATEST_VERSION);
    let reviewed = store
        .corrections_by_status(&FeedbackScope::new("acme", "db"), CorrectionStatus::Reviewed)
        .unwrap();
    assert_eq!(reviewed.len(), 1);
    assert_eq!(reviewed[0].id, record.id);
}

#[test]
fn migrations_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feedback.db");
    for _ in 0..3 {
        let store = SqliteFeedbackStore::open(&path).unwrap();
        assert_eq!(store.schema_version().unwrap(), LATEST_VERSION);
    }
}
