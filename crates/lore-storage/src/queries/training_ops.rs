//! Training example CRUD. One example per correction, enforced by a UNIQUE column.

use rusqlite::{params, Connection, OptionalExtension, Row};

use lore_core::errors::{FeedbackError, LoreResult};
use lore_core::models::{FeedbackScope, TrainingExample, ValidationStatus};

use super::{format_ts, parse_ts};
use crate::sqlite_err;

const TABLE: &str = "training_examples";

const COLUMNS: &str = "id, correction_id, tenant_id, domain_id, query_pattern, correct_response, \
     incorrect_response, notes, weight, validation_status, usage_count, created_at";

struct RawExample {
    id: String,
    correction_id: String,
    tenant_id: String,
    domain_id: String,
    query_pattern: String,
    correct_response: String,
    incorrect_response: String,
    notes: String,
    weight: f64,
    validation_status: String,
    usage_count: i64,
    created_at: String,
}

impl RawExample {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            correction_id: row.get(1)?,
            tenant_id: row.get(2)?,
            domain_id: row.get(3)?,
            query_pattern: row.get(4)?,
            correct_response: row.get(5)?,
            incorrect_response: row.get(6)?,
            notes: row.get(7)?,
            weight: row.get(8)?,
            validation_status: row.get(9)?,
            usage_count: row.get(10)?,
            created_at: row.get(11)?,
        })
    }

    fn into_example(self) -> LoreResult<TrainingExample> {
        Ok(TrainingExample {
            validation_status: self.validation_status.parse()?,
            created_at: parse_ts(TABLE, &self.created_at)?,
            usage_count: self.usage_count.max(0) as u64,
            id: self.id,
            correction_id: self.correction_id,
            tenant_id: self.tenant_id,
            domain_id: self.domain_id,
            query_pattern: self.query_pattern,
            correct_response: self.correct_response,
            incorrect_response: self.incorrect_response,
            notes: self.notes,
            weight: self.weight,
        })
    }
}

fn collect(
    rows: impl Iterator<Item = rusqlite::Result<RawExample>>,
    operation: &str,
) -> LoreResult<Vec<TrainingExample>> {
    let mut examples = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| sqlite_err(operation, e))?;
        examples.push(raw.into_example()?);
    }
    Ok(examples)
}

/// Insert unless the correction already has an example. Returns the stored row
/// and whether this call created it.
pub fn insert_if_absent(
    conn: &Connection,
    example: &TrainingExample,
) -> LoreResult<(TrainingExample, bool)> {
    let inserted = conn
        .execute(
            &format!(
                "INSERT INTO training_examples ({COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                 ON CONFLICT(correction_id) DO NOTHING"
            ),
            params![
                example.id,
                example.correction_id,
                example.tenant_id,
                example.domain_id,
                example.query_pattern,
                example.correct_response,
                example.incorrect_response,
                example.notes,
                example.weight,
                example.validation_status.as_str(),
                example.usage_count as i64,
                format_ts(&example.created_at),
            ],
        )
        .map_err(|e| sqlite_err("insert_training_example", e))?;

    match by_correction(conn, &example.correction_id)? {
        Some(stored) => Ok((stored, inserted == 1)),
        None => Err(FeedbackError::InvariantViolation {
            reason: format!(
                "training example for correction {} vanished after insert",
                example.correction_id
            ),
        }
        .into()),
    }
}

pub fn get(conn: &Connection, id: &str) -> LoreResult<Option<TrainingExample>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM training_examples WHERE id = ?1"),
        params![id],
        RawExample::from_row,
    )
    .optional()
    .map_err(|e| sqlite_err("get_training_example", e))?
    .map(RawExample::into_example)
    .transpose()
}

pub fn by_correction(conn: &Connection, correction_id: &str) -> LoreResult<Option<TrainingExample>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM training_examples WHERE correction_id = ?1"),
        params![correction_id],
        RawExample::from_row,
    )
    .optional()
    .map_err(|e| sqlite_err("training_example_for_correction", e))?
    .map(RawExample::into_example)
    .transpose()
}

pub fn list(
    conn: &Connection,
    scope: &FeedbackScope,
    status: Option<ValidationStatus>,
) -> LoreResult<Vec<TrainingExample>> {
    let op = "training_examples";
    match status {
        Some(status) => {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {COLUMNS} FROM training_examples
                     WHERE tenant_id = ?1 AND domain_id = ?2 AND validation_status = ?3
                     ORDER BY weight DESC, created_at, id"
                ))
                .map_err(|e| sqlite_err(op, e))?;
            let rows = stmt
                .query_map(
                    params![scope.tenant_id, scope.domain_id, status.as_str()],
                    RawExample::from_row,
                )
                .map_err(|e| sqlite_err(op, e))?;
            collect(rows, op)
        }
        None => {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {COLUMNS} FROM training_examples
                     WHERE tenant_id = ?1 AND domain_id = ?2
                     ORDER BY weight DESC, created_at, id"
                ))
                .map_err(|e| sqlite_err(op, e))?;
            let rows = stmt
                .query_map(params![scope.tenant_id, scope.domain_id], RawExample::from_row)
                .map_err(|e| sqlite_err(op, e))?;
            collect(rows, op)
        }
    }
}

pub fn transition(
    conn: &Connection,
    id: &str,
    expected: ValidationStatus,
    next: ValidationStatus,
) -> LoreResult<bool> {
    let changed = conn
        .execute(
            "UPDATE training_examples SET validation_status = ?3
             WHERE id = ?1 AND validation_status = ?2",
            params![id, expected.as_str(), next.as_str()],
        )
        .map_err(|e| sqlite_err("transition_training_example", e))?;
    Ok(changed == 1)
}

pub fn update_weight(conn: &Connection, id: &str, weight: f64) -> LoreResult<()> {
    let changed = conn
        .execute(
            "UPDATE training_examples SET weight = ?2 WHERE id = ?1",
            params![id, weight],
        )
        .map_err(|e| sqlite_err("update_training_weight", e))?;
    not_found_if_zero(changed, id)
}

pub fn increment_usage(conn: &Connection, id: &str) -> LoreResult<()> {
    let changed = conn
        .execute(
            "UPDATE training_examples SET usage_count = usage_count + 1 WHERE id = ?1",
            params![id],
        )
        .map_err(|e| sqlite_err("increment_usage", e))?;
    not_found_if_zero(changed, id)
}

fn not_found_if_zero(changed: usize, id: &str) -> LoreResult<()> {
    if changed == 0 {
        return Err(FeedbackError::NotFound {
            entity: "training_example".to_string(),
            id: id.to_string(),
        }
        .into());
    }
    Ok(())
}
