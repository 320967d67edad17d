use tracing::info;

use lore_core::errors::FeedbackError;
use lore_core::models::{
    CorrectionStatus, ErrorDetails, ImprovementMetrics, ImprovementPatch, ImprovementRecord,
    ImprovementStatus, TrainingExample,
};
use lore_core::LoreResult;
use lore_observability::tracing_setup::events;

use crate::engine::FeedbackGeneralizer;

impl FeedbackGeneralizer {
    pub(crate) async fn load_improvement(&self, id: &str) -> LoreResult<ImprovementRecord> {
        self.retry
            .run("get_improvement", || self.store.get_improvement(id))
            .await?
            .ok_or_else(|| {
                FeedbackError::NotFound {
                    entity: "improvement".to_string(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    /// Compare-and-set from the record's current status, then reload.
    pub(crate) async fn move_improvement(
        &self,
        record: &ImprovementRecord,
        next: ImprovementStatus,
        patch: ImprovementPatch,
    ) -> LoreResult<ImprovementRecord> {
        let moved = self
            .retry
            .run("transition_improvement", || {
                self.store
                    .transition_improvement(&record.id, record.status, next, &patch)
            })
            .await?;
        let current = self.load_improvement(&record.id).await?;
        if !moved {
            return Err(FeedbackError::StatusConflict {
                entity: "improvement".to_string(),
                id: record.id.clone(),
                expected: record.status.to_string(),
                actual: current.status.to_string(),
            }
            .into());
        }
        events::improvement_transitioned(&record.id, record.status.as_str(), next.as_str());
        Ok(current)
    }

    async fn examples_of(&self, record: &ImprovementRecord) -> LoreResult<Vec<TrainingExample>> {
        let mut examples = Vec::with_capacity(record.training_example_ids.len());
        for id in &record.training_example_ids {
            let example = self
                .retry
                .run("get_training_example", || self.store.get_training_example(id))
                .await?;
            examples.extend(example);
        }
        Ok(examples)
    }

    /// Submit a still-planned improvement, e.g. one created without an ingestor.
    pub async fn submit_planned(&self, improvement_id: &str) -> LoreResult<ImprovementRecord> {
        let record = self.load_improvement(improvement_id).await?;
        if record.status != ImprovementStatus::Planned {
            return Err(FeedbackError::InvalidTransition {
                entity: "improvement".to_string(),
                id: record.id.clone(),
                from: record.status.to_string(),
                to: ImprovementStatus::InProgress.to_string(),
            }
            .into());
        }
        let examples = self.examples_of(&record).await?;
        self.submit(record, &examples).await
    }

    /// Mark an in-progress improvement completed.
    ///
    /// Requires at least one validated training example. Corrections behind
    /// the validated examples advance `reviewed → applied`.
    pub async fn complete(
        &self,
        improvement_id: &str,
        mut metrics: ImprovementMetrics,
    ) -> LoreResult<ImprovementRecord> {
        let record = self.load_improvement(improvement_id).await?;
        let validated: Vec<TrainingExample> = self
            .examples_of(&record)
            .await?
            .into_iter()
            .filter(TrainingExample::is_validated)
            .collect();
        if validated.is_empty() {
            return Err(FeedbackError::InvariantViolation {
                reason: format!(
                    "improvement {improvement_id} references no validated training example"
                ),
            }
            .into());
        }

        metrics.corrections_applied = validated.len();
        let completed = self
            .move_improvement(
                &record,
                ImprovementStatus::Completed,
                ImprovementPatch {
                    metrics: Some(metrics),
                    ..Default::default()
                },
            )
            .await?;

        let mut applied = 0;
        for example in &validated {
            let moved = self
                .retry
                .run("transition_correction", || {
                    self.store.transition_correction(
                        &example.correction_id,
                        CorrectionStatus::Reviewed,
                        CorrectionStatus::Applied,
                    )
                })
                .await?;
            if moved {
                applied += 1;
            }
        }
        info!(improvement_id, applied, "improvement completed");
        Ok(completed)
    }

    /// Mark an improvement failed. Terminal; keeps the error details.
    pub async fn fail(
        &self,
        improvement_id: &str,
        details: ErrorDetails,
    ) -> LoreResult<ImprovementRecord> {
        let record = self.load_improvement(improvement_id).await?;
        self.move_improvement(
            &record,
            ImprovementStatus::Failed,
            ImprovementPatch {
                error: Some(details),
                ..Default::default()
            },
        )
        .await
    }
}
