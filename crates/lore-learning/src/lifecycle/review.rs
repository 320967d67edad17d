//! Reviewer operations: validate or reject examples, reject corrections, reweight.

use lore_core::errors::FeedbackError;
use lore_core::models::{CorrectionRecord, CorrectionStatus, TrainingExample, ValidationStatus};
use lore_core::LoreResult;
use lore_observability::tracing_setup::events;

use crate::engine::FeedbackGeneralizer;

impl FeedbackGeneralizer {
    async fn load_example(&self, id: &str) -> LoreResult<TrainingExample> {
        self.retry
            .run("get_training_example", || self.store.get_training_example(id))
            .await?
            .ok_or_else(|| {
                FeedbackError::NotFound {
                    entity: "training_example".to_string(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    async fn load_correction(&self, id: &str) -> LoreResult<CorrectionRecord> {
        self.retry
            .run("get_correction", || self.store.get_correction(id))
            .await?
            .ok_or_else(|| {
                FeedbackError::NotFound {
                    entity: "correction".to_string(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    async fn review_example(&self, id: &str, next: ValidationStatus) -> LoreResult<TrainingExample> {
        let example = self.load_example(id).await?;
        let moved = self
            .retry
            .run("transition_training_example", || {
                self.store
                    .transition_training_example(id, example.validation_status, next)
            })
            .await?;
        let current = self.load_example(id).await?;
        if !moved {
            return Err(FeedbackError::StatusConflict {
                entity: "training_example".to_string(),
                id: id.to_string(),
                expected: example.validation_status.to_string(),
                actual: current.validation_status.to_string(),
            }
            .into());
        }
        Ok(current)
    }

    pub async fn validate_example(&self, id: &str) -> LoreResult<TrainingExample> {
        self.review_example(id, ValidationStatus::Validated).await
    }

    pub async fn reject_example(&self, id: &str) -> LoreResult<TrainingExample> {
        self.review_example(id, ValidationStatus::Rejected).await
    }

    /// Reject a pending correction. The record is kept, never deleted.
    pub async fn reject_correction(&self, id: &str, reason: &str) -> LoreResult<CorrectionRecord> {
        let record = self.load_correction(id).await?;
        let moved = self
            .retry
            .run("transition_correction", || {
                self.store
                    .transition_correction(id, record.status, CorrectionStatus::Rejected)
            })
            .await?;
        let current = self.load_correction(id).await?;
        if !moved {
            return Err(FeedbackError::StatusConflict {
                entity: "correction".to_string(),
                id: id.to_string(),
                expected: record.status.to_string(),
                actual: current.status.to_string(),
            }
            .into());
        }
        events::correction_rejected(id, reason);
        Ok(current)
    }

    /// Weight and usage stay mutable after validation.
    pub async fn set_weight(&self, id: &str, weight: f64) -> LoreResult<TrainingExample> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(FeedbackError::InvariantViolation {
                reason: format!("weight must be a non-negative number, got {weight}"),
            }
            .into());
        }
        self.load_example(id).await?;
        self.retry
            .run("update_training_weight", || {
                self.store.update_training_weight(id, weight)
            })
            .await?;
        self.load_example(id).await
    }
}
