//! In-memory IFeedbackStore backed by concurrent maps.
//!
//! Each compare-and-set holds only the shard lock of the record it touches.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use lore_core::errors::{FeedbackError, LoreResult};
use lore_core::models::{
    CorrectionRecord, CorrectionStatus, FeedbackScope, ImprovementPatch, ImprovementRecord,
    ImprovementStatus, TrainingExample, ValidationStatus,
};
use lore_core::traits::IFeedbackStore;

#[derive(Default)]
pub struct MemoryFeedbackStore {
    corrections: DashMap<String, CorrectionRecord>,
    examples: DashMap<String, TrainingExample>,
    /// correction_id -> training example id.
    examples_by_correction: DashMap<String, String>,
    improvements: DashMap<String, ImprovementRecord>,
}

impl MemoryFeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(entity: &str, id: &str) -> FeedbackError {
    FeedbackError::NotFound {
        entity: entity.to_string(),
        id: id.to_string(),
    }
}

fn illegal(entity: &str, id: &str, from: impl ToString, to: impl ToString) -> FeedbackError {
    FeedbackError::InvalidTransition {
        entity: entity.to_string(),
        id: id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
    }
}

impl IFeedbackStore for MemoryFeedbackStore {
    fn insert_correction(&self, record: &CorrectionRecord) -> LoreResult<()> {
        match self.corrections.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(FeedbackError::InvariantViolation {
                reason: format!("correction {} already exists", record.id),
            }
            .into()),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }

    fn get_correction(&self, id: &str) -> LoreResult<Option<CorrectionRecord>> {
        Ok(self.corrections.get(id).map(|r| r.clone()))
    }

    fn corrections_by_status(
        &self,
        scope: &FeedbackScope,
        status: CorrectionStatus,
    ) -> LoreResult<Vec<CorrectionRecord>> {
        let mut records: Vec<CorrectionRecord> = self
            .corrections
            .iter()
            .filter(|r| r.in_scope(scope) && r.status == status)
            .map(|r| r.clone())
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    fn transition_correction(
        &self,
        id: &str,
        expected: CorrectionStatus,
        next: CorrectionStatus,
    ) -> LoreResult<bool> {
        if !expected.can_transition_to(next) {
            return Err(illegal("correction", id, expected, next).into());
        }
        let Some(mut record) = self.corrections.get_mut(id) else {
            return Ok(false);
        };
        if record.status != expected {
            return Ok(false);
        }
        record.status = next;
        record.processed_at = Some(chrono::Utc::now());
        Ok(true)
    }

    fn insert_training_example_if_absent(
        &self,
        example: &TrainingExample,
    ) -> LoreResult<(TrainingExample, bool)> {
        match self.examples_by_correction.entry(example.correction_id.clone()) {
            Entry::Occupied(slot) => {
                let existing = self
                    .examples
                    .get(slot.get())
                    .map(|e| e.clone())
                    .ok_or_else(|| not_found("training_example", slot.get()))?;
                Ok((existing, false))
            }
            Entry::Vacant(slot) => {
                self.examples.insert(example.id.clone(), example.clone());
                slot.insert(example.id.clone());
                Ok((example.clone(), true))
            }
        }
    }

    fn get_training_example(&self, id: &str) -> LoreResult<Option<TrainingExample>> {
        Ok(self.examples.get(id).map(|e| e.clone()))
    }

    fn training_example_for_correction(
        &self,
        correction_id: &str,
    ) -> LoreResult<Option<TrainingExample>> {
        let Some(example_id) = self
            .examples_by_correction
            .get(correction_id)
            .map(|id| id.clone())
        else {
            return Ok(None);
        };
        self.get_training_example(&example_id)
    }

    fn training_examples(
        &self,
        scope: &FeedbackScope,
        status: Option<ValidationStatus>,
    ) -> LoreResult<Vec<TrainingExample>> {
        let mut examples: Vec<TrainingExample> = self
            .examples
            .iter()
            .filter(|e| e.tenant_id == scope.tenant_id && e.domain_id == scope.domain_id)
            .filter(|e| status.map_or(true, |s| e.validation_status == s))
            .map(|e| e.clone())
            .collect();
        examples.sort_by(|a, b| {
            b.weight
                .total_cmp(&a.weight)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(examples)
    }

    fn transition_training_example(
        &self,
        id: &str,
        expected: ValidationStatus,
        next: ValidationStatus,
    ) -> LoreResult<bool> {
        if !expected.can_transition_to(next) {
            return Err(illegal("training_example", id, expected, next).into());
        }
        let Some(mut example) = self.examples.get_mut(id) else {
            return Ok(false);
        };
        if example.validation_status != expected {
            return Ok(false);
        }
        example.validation_status = next;
        Ok(true)
    }

    fn update_training_weight(&self, id: &str, weight: f64) -> LoreResult<()> {
        let mut example = self
            .examples
            .get_mut(id)
            .ok_or_else(|| not_found("training_example", id))?;
        example.weight = weight;
        Ok(())
    }

    fn increment_usage(&self, id: &str) -> LoreResult<()> {
        let mut example = self
            .examples
            .get_mut(id)
            .ok_or_else(|| not_found("training_example", id))?;
        example.usage_count += 1;
        Ok(())
    }

    fn insert_improvement(&self, record: &ImprovementRecord) -> LoreResult<()> {
        self.improvements.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn get_improvement(&self, id: &str) -> LoreResult<Option<ImprovementRecord>> {
        Ok(self.improvements.get(id).map(|r| r.clone()))
    }

    fn transition_improvement(
        &self,
        id: &str,
        expected: ImprovementStatus,
        next: ImprovementStatus,
        patch: &ImprovementPatch,
    ) -> LoreResult<bool> {
        if !expected.can_transition_to(next) {
            return Err(illegal("improvement", id, expected, next).into());
        }
        let Some(mut record) = self.improvements.get_mut(id) else {
            return Ok(false);
        };
        if record.status != expected {
            return Ok(false);
        }
        record.apply(next, patch.clone())?;
        Ok(true)
    }
}
