//! SqliteFeedbackStore: owns the write connection, runs migrations, and
//! implements IFeedbackStore on top of the query modules.

use std::path::Path;

use tracing::debug;

use lore_core::errors::{FeedbackError, LoreResult};
use lore_core::models::{
    CorrectionRecord, CorrectionStatus, FeedbackScope, ImprovementPatch, ImprovementRecord,
    ImprovementStatus, TrainingExample, ValidationStatus,
};
use lore_core::traits::IFeedbackStore;

use crate::migrations;
use crate::pool::WriteConnection;
use crate::queries::{correction_ops, improvement_ops, training_ops};

pub struct SqliteFeedbackStore {
    writer: WriteConnection,
}

impl SqliteFeedbackStore {
    /// Open a store backed by a file on disk.
    pub fn open(path: &Path) -> LoreResult<Self> {
        let store = Self {
            writer: WriteConnection::open(path)?,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> LoreResult<Self> {
        let store = Self {
            writer: WriteConnection::open_in_memory()?,
        };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> LoreResult<()> {
        self.writer.with_conn(|conn| {
            let version = migrations::run_migrations(conn)?;
            debug!(version, "feedback store ready");
            Ok(())
        })
    }

    pub fn schema_version(&self) -> LoreResult<u32> {
        self.writer.with_conn(migrations::current_version)
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

impl IFeedbackStore for SqliteFeedbackStore {
    fn insert_correction(&self, record: &CorrectionRecord) -> LoreResult<()> {
        self.writer
            .with_conn(|conn| correction_ops::insert_correction(conn, record))
    }

    fn get_correction(&self, id: &str) -> LoreResult<Option<CorrectionRecord>> {
        self.writer
            .with_conn(|conn| correction_ops::get_correction(conn, id))
    }

    fn corrections_by_status(
        &self,
        scope: &FeedbackScope,
        status: CorrectionStatus,
    ) -> LoreResult<Vec<CorrectionRecord>> {
        self.writer
            .with_conn(|conn| correction_ops::corrections_by_status(conn, scope, status))
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
        self.writer
            .with_conn(|conn| correction_ops::transition_correction(conn, id, expected, next))
    }

    fn insert_training_example_if_absent(
        &self,
        example: &TrainingExample,
    ) -> LoreResult<(TrainingExample, bool)> {
        self.writer
            .with_conn(|conn| training_ops::insert_if_absent(conn, example))
    }

    fn get_training_example(&self, id: &str) -> LoreResult<Option<TrainingExample>> {
        self.writer.with_conn(|conn| training_ops::get(conn, id))
    }

    fn training_example_for_correction(
        &self,
        correction_id: &str,
    ) -> LoreResult<Option<TrainingExample>> {
        self.writer
            .with_conn(|conn| training_ops::by_correction(conn, correction_id))
    }

    fn training_examples(
        &self,
        scope: &FeedbackScope,
        status: Option<ValidationStatus>,
    ) -> LoreResult<Vec<TrainingExample>> {
        self.writer
            .with_conn(|conn| training_ops::list(conn, scope, status))
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
        self.writer
            .with_conn(|conn| training_ops::transition(conn, id, expected, next))
    }

    fn update_training_weight(&self, id: &str, weight: f64) -> LoreResult<()> {
        self.writer
            .with_conn(|conn| training_ops::update_weight(conn, id, weight))
    }

    fn increment_usage(&self, id: &str) -> LoreResult<()> {
        self.writer
            .with_conn(|conn| training_ops::increment_usage(conn, id))
    }

    fn insert_improvement(&self, record: &ImprovementRecord) -> LoreResult<()> {
        self.writer
            .with_conn(|conn| improvement_ops::insert(conn, record))
    }

    fn get_improvement(&self, id: &str) -> LoreResult<Option<ImprovementRecord>> {
        self.writer.with_conn(|conn| improvement_ops::get(conn, id))
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
        self.writer
            .with_conn(|conn| improvement_ops::transition(conn, id, expected, next, patch))
    }
}
