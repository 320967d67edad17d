//! Correction records, training examples, and improvement records.
//!
//! Status enums own their state machines; stores and the generalizer ask
//! `can_transition_to` before any compare-and-set.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{FeedbackError, StorageError};

macro_rules! status_strings {
    ($ty:ident, $entity:literal, { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $s,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = StorageError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok($ty::$variant),)+
                    other => Err(StorageError::CorruptRow {
                        table: $entity.to_string(),
                        details: format!("unknown status '{other}'"),
                    }),
                }
            }
        }
    };
}

// --- CorrectionRecord ---

/// Lifecycle of a user correction: `pending → reviewed → applied`, or `pending → rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionStatus {
    Pending,
    Reviewed,
    Applied,
    Rejected,
}

status_strings!(CorrectionStatus, "corrections", {
    Pending => "pending",
    Reviewed => "reviewed",
    Applied => "applied",
    Rejected => "rejected",
});

impl CorrectionStatus {
    pub fn can_transition_to(self, next: CorrectionStatus) -> bool {
        matches!(
            (self, next),
            (CorrectionStatus::Pending, CorrectionStatus::Reviewed)
                | (CorrectionStatus::Pending, CorrectionStatus::Rejected)
                | (CorrectionStatus::Reviewed, CorrectionStatus::Applied)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CorrectionStatus::Applied | CorrectionStatus::Rejected)
    }
}

/// What kind of problem the user reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemCategory {
    IncorrectSql,
    WrongTable,
    MissingInformation,
    OutdatedInformation,
    Formatting,
    #[serde(other)]
    Other,
}

impl ProblemCategory {
    pub const ALL: [ProblemCategory; 6] = [
        ProblemCategory::IncorrectSql,
        ProblemCategory::WrongTable,
        ProblemCategory::MissingInformation,
        ProblemCategory::OutdatedInformation,
        ProblemCategory::Formatting,
        ProblemCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProblemCategory::IncorrectSql => "incorrect_sql",
            ProblemCategory::WrongTable => "wrong_table",
            ProblemCategory::MissingInformation => "missing_information",
            ProblemCategory::OutdatedInformation => "outdated_information",
            ProblemCategory::Formatting => "formatting",
            ProblemCategory::Other => "other",
        }
    }

    /// Lenient parse: unknown categories become `Other`.
    pub fn parse_lenient(s: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .unwrap_or(ProblemCategory::Other)
    }
}

/// A user correction delivered by the feedback intake surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub id: String,
    pub tenant_id: String,
    pub domain_id: String,
    pub query_text: String,
    pub incorrect_response: String,
    pub corrected_response: String,
    pub notes: String,
    pub category: ProblemCategory,
    pub status: CorrectionStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl CorrectionRecord {
    pub fn new(
        tenant_id: impl Into<String>,
        domain_id: impl Into<String>,
        query_text: impl Into<String>,
        incorrect_response: impl Into<String>,
        corrected_response: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: tenant_id.into(),
            domain_id: domain_id.into(),
            query_text: query_text.into(),
            incorrect_response: incorrect_response.into(),
            corrected_response: corrected_response.into(),
            notes: String::new(),
            category: ProblemCategory::Other,
            status: CorrectionStatus::Pending,
            created_at: Utc::now(),
            processed_at: None,
        }
    }

    pub fn in_scope(&self, scope: &FeedbackScope) -> bool {
        self.tenant_id == scope.tenant_id && self.domain_id == scope.domain_id
    }
}

// --- TrainingExample ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Pending,
    Validated,
    Rejected,
}

status_strings!(ValidationStatus, "training_examples", {
    Pending => "pending",
    Validated => "validated",
    Rejected => "rejected",
});

impl ValidationStatus {
    pub fn can_transition_to(self, next: ValidationStatus) -> bool {
        matches!(
            (self, next),
            (ValidationStatus::Pending, ValidationStatus::Validated)
                | (ValidationStatus::Pending, ValidationStatus::Rejected)
        )
    }
}

/// Reusable training signal derived from a correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub id: String,
    /// The correction this example was derived from. Unique per example.
    pub correction_id: String,
    pub tenant_id: String,
    pub domain_id: String,
    pub query_pattern: String,
    pub correct_response: String,
    pub incorrect_response: String,
    pub notes: String,
    pub weight: f64,
    pub validation_status: ValidationStatus,
    pub usage_count: u64,
    pub created_at: DateTime<Utc>,
}

impl TrainingExample {
    pub fn is_validated(&self) -> bool {
        self.validation_status == ValidationStatus::Validated
    }
}

// --- ImprovementRecord ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImprovementStatus {
    Planned,
    InProgress,
    Completed,
    Failed,
}

status_strings!(ImprovementStatus, "improvements", {
    Planned => "planned",
    InProgress => "in_progress",
    Completed => "completed",
    Failed => "failed",
});

impl ImprovementStatus {
    pub fn can_transition_to(self, next: ImprovementStatus) -> bool {
        matches!(
            (self, next),
            (ImprovementStatus::Planned, ImprovementStatus::InProgress)
                | (ImprovementStatus::Planned, ImprovementStatus::Failed)
                | (ImprovementStatus::InProgress, ImprovementStatus::Completed)
                | (ImprovementStatus::InProgress, ImprovementStatus::Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ImprovementStatus::Completed | ImprovementStatus::Failed)
    }
}

/// How an improvement is pushed into the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationMethod {
    IngestionJob,
}

/// Why an improvement failed. Retained forever on failed records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub message: String,
    pub stage: String,
    pub occurred_at: DateTime<Utc>,
}

impl ErrorDetails {
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stage: stage.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// Outcome metrics of a knowledge-base update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImprovementMetrics {
    pub documents_submitted: usize,
    pub documents_indexed: usize,
    pub corrections_applied: usize,
}

impl ImprovementMetrics {
    pub fn success_rate(&self) -> f64 {
        if self.documents_submitted == 0 {
            return 0.0;
        }
        self.documents_indexed as f64 / self.documents_submitted as f64
    }
}

/// Fields written alongside an improvement status transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImprovementPatch {
    pub ingestion_job_id: Option<String>,
    pub metrics: Option<ImprovementMetrics>,
    pub error: Option<ErrorDetails>,
}

/// Audit entry for one knowledge-base update attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImprovementRecord {
    pub id: String,
    pub tenant_id: String,
    pub domain_id: String,
    pub kind: String,
    pub description: String,
    pub training_example_ids: Vec<String>,
    pub method: ImplementationMethod,
    pub status: ImprovementStatus,
    pub ingestion_job_id: Option<String>,
    pub metrics: Option<ImprovementMetrics>,
    pub error: Option<ErrorDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImprovementRecord {
    /// Apply a transition in memory, enforcing the state machine.
    pub fn apply(
        &mut self,
        next: ImprovementStatus,
        patch: ImprovementPatch,
    ) -> Result<(), FeedbackError> {
        if !self.status.can_transition_to(next) {
            return Err(FeedbackError::InvalidTransition {
                entity: "improvement".to_string(),
                id: self.id.clone(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        if next == ImprovementStatus::Failed && patch.error.is_none() {
            return Err(FeedbackError::InvariantViolation {
                reason: format!("failed improvement {} must carry error details", self.id),
            });
        }
        self.status = next;
        if patch.ingestion_job_id.is_some() {
            self.ingestion_job_id = patch.ingestion_job_id;
        }
        if patch.metrics.is_some() {
            self.metrics = patch.metrics;
        }
        if patch.error.is_some() {
            self.error = patch.error;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// A corrected document submitted to the passage store for ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionDocument {
    pub query_pattern: String,
    pub correct_response: String,
    pub explanation: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Which slice of the feedback records an operation touches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackScope {
    pub tenant_id: String,
    pub domain_id: String,
}

impl FeedbackScope {
    pub fn new(tenant_id: impl Into<String>, domain_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            domain_id: domain_id.into(),
        }
    }
}
