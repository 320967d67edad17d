//! FeedbackGeneralizer: pending corrections → training examples → improvement.
//!
//! A run is idempotent. Corrections that already have a training example are
//! skipped (and moved to `reviewed` if an earlier run stopped short of that),
//! so processing the same scope twice yields the same set of examples.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn, Instrument};

use lore_core::config::LearningConfig;
use lore_core::constants::IMPROVEMENT_KIND_CONTENT_UPDATE;
use lore_core::models::{
    CorrectionRecord, CorrectionStatus, ErrorDetails, FeedbackScope, ImplementationMethod,
    ImprovementMetrics, ImprovementPatch, ImprovementRecord, ImprovementStatus, TrainingExample,
    ValidationStatus,
};
use lore_core::traits::{IFeedbackStore, IKnowledgeIngestor};
use lore_core::{LoreError, LoreResult};
use lore_observability::tracing_setup::events;

use crate::analysis::{generalize_pattern, weight_for};
use crate::lifecycle::documents::correction_documents;
use crate::retry::RetryPolicy;

/// Outcome of one `process` run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessReport {
    pub dry_run: bool,
    /// Examples created by this run (or that would be, for a dry run).
    pub examples: Vec<TrainingExample>,
    /// Correction ids that already had a training example.
    pub skipped: Vec<String>,
    /// Correction ids that could not be generalized.
    pub rejected: Vec<String>,
    pub improvement: Option<ImprovementRecord>,
}

impl ProcessReport {
    pub fn processed(&self) -> usize {
        self.examples.len()
    }
}

/// Reject corrections that cannot become a training example.
pub fn validate_correction(record: &CorrectionRecord) -> LoreResult<()> {
    let reason = if record.corrected_response.trim().is_empty() {
        "corrected response is empty"
    } else if record.query_text.trim().is_empty() {
        "query text is empty"
    } else {
        return Ok(());
    };
    Err(LoreError::FeedbackValidationRejected {
        record_id: record.id.clone(),
        reason: reason.to_string(),
    })
}

pub struct FeedbackGeneralizer {
    pub(crate) store: Arc<dyn IFeedbackStore>,
    pub(crate) ingestor: Option<Arc<dyn IKnowledgeIngestor>>,
    pub(crate) retry: RetryPolicy,
    default_weight: f64,
}

impl FeedbackGeneralizer {
    pub fn new(store: Arc<dyn IFeedbackStore>, config: &LearningConfig) -> Self {
        Self {
            store,
            ingestor: None,
            retry: RetryPolicy::from_config(config),
            default_weight: config.default_weight,
        }
    }

    pub fn with_ingestor(mut self, ingestor: Arc<dyn IKnowledgeIngestor>) -> Self {
        self.ingestor = Some(ingestor);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Process every pending correction in `scope`.
    pub async fn process(&self, scope: &FeedbackScope, dry_run: bool) -> LoreResult<ProcessReport> {
        let span = lore_observability::feedback_span!(scope.tenant_id, scope.domain_id);
        async {
            let pending = self
                .retry
                .run("corrections_by_status", || {
                    self.store.corrections_by_status(scope, CorrectionStatus::Pending)
                })
                .await?;
            self.process_records(scope, &pending, dry_run).await
        }
        .instrument(span)
        .await
    }

    /// Process the given records. Records outside `scope` or not `pending` are ignored.
    pub async fn process_records(
        &self,
        scope: &FeedbackScope,
        records: &[CorrectionRecord],
        dry_run: bool,
    ) -> LoreResult<ProcessReport> {
        let mut report = ProcessReport {
            dry_run,
            ..Default::default()
        };

        for record in records {
            if !record.in_scope(scope) || record.status != CorrectionStatus::Pending {
                continue;
            }

            match validate_correction(record) {
                Ok(()) => {}
                Err(LoreError::FeedbackValidationRejected { record_id, reason }) => {
                    events::correction_rejected(&record_id, &reason);
                    if !dry_run {
                        self.advance_correction(&record_id, CorrectionStatus::Rejected)
                            .await?;
                    }
                    report.rejected.push(record_id);
                    continue;
                }
                Err(other) => return Err(other),
            }

            let existing = self
                .retry
                .run("training_example_for_correction", || {
                    self.store.training_example_for_correction(&record.id)
                })
                .await?;
            if existing.is_some() {
                if !dry_run {
                    self.advance_correction(&record.id, CorrectionStatus::Reviewed)
                        .await?;
                }
                report.skipped.push(record.id.clone());
                continue;
            }

            let example = self.build_example(record);
            if dry_run {
                report.examples.push(example);
                continue;
            }

            let (stored, created) = self
                .retry
                .run("insert_training_example", || {
                    self.store.insert_training_example_if_absent(&example)
                })
                .await?;
            self.advance_correction(&record.id, CorrectionStatus::Reviewed)
                .await?;
            if created {
                debug!(correction_id = %record.id, pattern = %stored.query_pattern, "training example created");
                report.examples.push(stored);
            } else {
                report.skipped.push(record.id.clone());
            }
        }

        if !dry_run && !report.examples.is_empty() {
            let improvement = self.plan_improvement(scope, &report.examples).await?;
            report.improvement = Some(self.submit(improvement, &report.examples).await?);
        }

        info!(
            tenant = %scope.tenant_id,
            domain = %scope.domain_id,
            dry_run,
            processed = report.examples.len(),
            skipped = report.skipped.len(),
            rejected = report.rejected.len(),
            "feedback processed"
        );
        Ok(report)
    }

    fn build_example(&self, record: &CorrectionRecord) -> TrainingExample {
        TrainingExample {
            id: uuid::Uuid::new_v4().to_string(),
            correction_id: record.id.clone(),
            tenant_id: record.tenant_id.clone(),
            domain_id: record.domain_id.clone(),
            query_pattern: generalize_pattern(&record.query_text),
            correct_response: record.corrected_response.clone(),
            incorrect_response: record.incorrect_response.clone(),
            notes: record.notes.clone(),
            weight: weight_for(record.category, self.default_weight),
            validation_status: ValidationStatus::Pending,
            usage_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Compare-and-set a pending correction. Losing the race is not an error.
    async fn advance_correction(&self, id: &str, next: CorrectionStatus) -> LoreResult<()> {
        let moved = self
            .retry
            .run("transition_correction", || {
                self.store
                    .transition_correction(id, CorrectionStatus::Pending, next)
            })
            .await?;
        if !moved {
            debug!(correction_id = %id, next = %next, "correction already advanced");
        }
        Ok(())
    }

    async fn plan_improvement(
        &self,
        scope: &FeedbackScope,
        examples: &[TrainingExample],
    ) -> LoreResult<ImprovementRecord> {
        let now = Utc::now();
        let record = ImprovementRecord {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: scope.tenant_id.clone(),
            domain_id: scope.domain_id.clone(),
            kind: IMPROVEMENT_KIND_CONTENT_UPDATE.to_string(),
            description: format!("Processed {} user corrections", examples.len()),
            training_example_ids: examples.iter().map(|e| e.id.clone()).collect(),
            method: ImplementationMethod::IngestionJob,
            status: ImprovementStatus::Planned,
            ingestion_job_id: None,
            metrics: None,
            error: None,
            created_at: now,
            updated_at: now,
        };
        self.retry
            .run("insert_improvement", || self.store.insert_improvement(&record))
            .await?;
        Ok(record)
    }

    /// Submit corrected documentation for a planned improvement.
    ///
    /// Success moves it to `in_progress` with the ingestion job id; a rejected
    /// submission fails it. Without an ingestor the record stays `planned`.
    pub(crate) async fn submit(
        &self,
        record: ImprovementRecord,
        examples: &[TrainingExample],
    ) -> LoreResult<ImprovementRecord> {
        let Some(ingestor) = &self.ingestor else {
            warn!(improvement_id = %record.id, "no ingestor configured, improvement left planned");
            return Ok(record);
        };

        let documents = correction_documents(examples);
        let (next, patch) = match ingestor.submit(&record.domain_id, &documents).await {
            Ok(job_id) => (
                ImprovementStatus::InProgress,
                ImprovementPatch {
                    ingestion_job_id: Some(job_id),
                    metrics: Some(ImprovementMetrics {
                        documents_submitted: documents.len(),
                        ..Default::default()
                    }),
                    error: None,
                },
            ),
            Err(e) => (
                ImprovementStatus::Failed,
                ImprovementPatch {
                    error: Some(ErrorDetails::new("ingestion", e.to_string())),
                    ..Default::default()
                },
            ),
        };
        self.move_improvement(&record, next, patch).await
    }
}
