//! Improvement record CRUD. Transitions re-validate the state machine in memory
//! before the guarded UPDATE.

use rusqlite::{params, Connection, OptionalExtension, Row};

use lore_core::errors::LoreResult;
use lore_core::models::{
    ErrorDetails, ImplementationMethod, ImprovementMetrics, ImprovementPatch, ImprovementRecord,
    ImprovementStatus,
};

use super::{format_ts, parse_json, parse_ts};
use crate::sqlite_err;

const TABLE: &str = "improvements";

const COLUMNS: &str = "id, tenant_id, domain_id, kind, description, training_example_ids, \
     method, status, ingestion_job_id, metrics, error, created_at, updated_at";

struct RawImprovement {
    id: String,
    tenant_id: String,
    domain_id: String,
    kind: String,
    description: String,
    training_example_ids: String,
    method: String,
    status: String,
    ingestion_job_id: Option<String>,
    metrics: Option<String>,
    error: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RawImprovement {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            domain_id: row.get(2)?,
            kind: row.get(3)?,
            description: row.get(4)?,
            training_example_ids: row.get(5)?,
            method: row.get(6)?,
            status: row.get(7)?,
            ingestion_job_id: row.get(8)?,
            metrics: row.get(9)?,
            error: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    fn into_record(self) -> LoreResult<ImprovementRecord> {
        let method: ImplementationMethod = parse_json(TABLE, &format!("\"{}\"", self.method))?;
        Ok(ImprovementRecord {
            training_example_ids: parse_json(TABLE, &self.training_example_ids)?,
            method,
            status: self.status.parse()?,
            metrics: self
                .metrics
                .as_deref()
                .map(|raw| parse_json::<ImprovementMetrics>(TABLE, raw))
                .transpose()?,
            error: self
                .error
                .as_deref()
                .map(|raw| parse_json::<ErrorDetails>(TABLE, raw))
                .transpose()?,
            created_at: parse_ts(TABLE, &self.created_at)?,
            updated_at: parse_ts(TABLE, &self.updated_at)?,
            id: self.id,
            tenant_id: self.tenant_id,
            domain_id: self.domain_id,
            kind: self.kind,
            description: self.description,
            ingestion_job_id: self.ingestion_job_id,
        })
    }
}

fn method_str(method: ImplementationMethod) -> &'static str {
    match method {
        ImplementationMethod::IngestionJob => "ingestion_job",
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> LoreResult<String> {
    Ok(serde_json::to_string(value)?)
}

pub fn insert(conn: &Connection, record: &ImprovementRecord) -> LoreResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO improvements ({COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            record.id,
            record.tenant_id,
            record.domain_id,
            record.kind,
            record.description,
            to_json(&record.training_example_ids)?,
            method_str(record.method),
            record.status.as_str(),
            record.ingestion_job_id,
            record.metrics.as_ref().map(to_json).transpose()?,
            record.error.as_ref().map(to_json).transpose()?,
            format_ts(&record.created_at),
            format_ts(&record.updated_at),
        ],
    )
    .map_err(|e| sqlite_err("insert_improvement", e))?;
    Ok(())
}

pub fn get(conn: &Connection, id: &str) -> LoreResult<Option<ImprovementRecord>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM improvements WHERE id = ?1"),
        params![id],
        RawImprovement::from_row,
    )
    .optional()
    .map_err(|e| sqlite_err("get_improvement", e))?
    .map(RawImprovement::into_record)
    .transpose()
}

/// Compare-and-set transition. Returns false if the record is missing or its
/// stored status differs from `expected`; errors if the transition is illegal.
pub fn transition(
    conn: &Connection,
    id: &str,
    expected: ImprovementStatus,
    next: ImprovementStatus,
    patch: &ImprovementPatch,
) -> LoreResult<bool> {
    let Some(mut record) = get(conn, id)? else {
        return Ok(false);
    };
    if record.status != expected {
        return Ok(false);
    }
    record.apply(next, patch.clone())?;

    let changed = conn
        .execute(
            "UPDATE improvements
             SET status = ?3, ingestion_job_id = ?4, metrics = ?5, error = ?6, updated_at = ?7
             WHERE id = ?1 AND status = ?2",
            params![
                id,
                expected.as_str(),
                record.status.as_str(),
                record.ingestion_job_id,
                record.metrics.as_ref().map(to_json).transpose()?,
                record.error.as_ref().map(to_json).transpose()?,
                format_ts(&record.updated_at),
            ],
        )
        .map_err(|e| sqlite_err("transition_improvement", e))?;
    Ok(changed == 1)
}
