use crate::errors::LoreResult;
use crate::models::{
    CorrectionRecord, CorrectionStatus, FeedbackScope, ImprovementPatch, ImprovementRecord,
    ImprovementStatus, TrainingExample, ValidationStatus,
};

/// Persistence for correction records, training examples, and improvement records.
///
/// Every status change is a compare-and-set: it succeeds (`Ok(true)`) only if the
/// stored status still equals `expected`. No operation takes a lock wider than
/// the single record it touches.
pub trait IFeedbackStore: Send + Sync {
    // --- Corrections ---
    fn insert_correction(&self, record: &CorrectionRecord) -> LoreResult<()>;
    fn get_correction(&self, id: &str) -> LoreResult<Option<CorrectionRecord>>;
    fn corrections_by_status(
        &self,
        scope: &FeedbackScope,
        status: CorrectionStatus,
    ) -> LoreResult<Vec<CorrectionRecord>>;
    fn transition_correction(
        &self,
        id: &str,
        expected: CorrectionStatus,
        next: CorrectionStatus,
    ) -> LoreResult<bool>;

    // --- Training examples ---
    /// Insert unless an example already exists for the same correction.
    /// Returns the stored example and whether it was newly created.
    fn insert_training_example_if_absent(
        &self,
        example: &TrainingExample,
    ) -> LoreResult<(TrainingExample, bool)>;
    fn get_training_example(&self, id: &str) -> LoreResult<Option<TrainingExample>>;
    fn training_example_for_correction(
        &self,
        correction_id: &str,
    ) -> LoreResult<Option<TrainingExample>>;
    fn training_examples(
        &self,
        scope: &FeedbackScope,
        status: Option<ValidationStatus>,
    ) -> LoreResult<Vec<TrainingExample>>;
    fn transition_training_example(
        &self,
        id: &str,
        expected: ValidationStatus,
        next: ValidationStatus,
    ) -> LoreResult<bool>;
    fn update_training_weight(&self, id: &str, weight: f64) -> LoreResult<()>;
    fn increment_usage(&self, id: &str) -> LoreResult<()>;

    // --- Improvements ---
    fn insert_improvement(&self, record: &ImprovementRecord) -> LoreResult<()>;
    fn get_improvement(&self, id: &str) -> LoreResult<Option<ImprovementRecord>>;
    fn transition_improvement(
        &self,
        id: &str,
        expected: ImprovementStatus,
        next: ImprovementStatus,
        patch: &ImprovementPatch,
    ) -> LoreResult<bool>;
}
