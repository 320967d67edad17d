//! Correction record CRUD and status compare-and-set.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use lore_core::errors::LoreResult;
use lore_core::models::{CorrectionRecord, CorrectionStatus, FeedbackScope, ProblemCategory};

use super::{format_ts, parse_ts};
use crate::sqlite_err;

const TABLE: &str = "corrections";

const COLUMNS: &str = "id, tenant_id, domain_id, query_text, incorrect_response, \
     corrected_response, notes, category, status, created_at, processed_at";

struct RawCorrection {
    id: String,
    tenant_id: String,
    domain_id: String,
    query_text: String,
    incorrect_response: String,
    corrected_response: String,
    notes: String,
    category: String,
    status: String,
    created_at: String,
    processed_at: Option<String>,
}

impl RawCorrection {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            tenant_id: row.get(1)?,
            domain_id: row.get(2)?,
            query_text: row.get(3)?,
            incorrect_response: row.get(4)?,
            corrected_response: row.get(5)?,
            notes: row.get(6)?,
            category: row.get(7)?,
            status: row.get(8)?,
            created_at: row.get(9)?,
            processed_at: row.get(10)?,
        })
    }

    fn into_record(self) -> LoreResult<CorrectionRecord> {
        Ok(CorrectionRecord {
            status: self.status.parse()?,
            category: ProblemCategory::parse_lenient(&self.category),
            created_at: parse_ts(TABLE, &self.created_at)?,
            processed_at: self
                .processed_at
                .as_deref()
                .map(|raw| parse_ts(TABLE, raw))
                .transpose()?,
            id: self.id,
            tenant_id: self.tenant_id,
            domain_id: self.domain_id,
            query_text: self.query_text,
            incorrect_response: self.incorrect_response,
            corrected_response: self.corrected_response,
            notes: self.notes,
        })
    }
}

pub fn insert_correction(conn: &Connection, record: &CorrectionRecord) -> LoreResult<()> {
    conn.execute(
        &format!("INSERT INTO corrections ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
        params![
            record.id,
            record.tenant_id,
            record.domain_id,
            record.query_text,
            record.incorrect_response,
            record.corrected_response,
            record.notes,
            record.category.as_str(),
            record.status.as_str(),
            format_ts(&record.created_at),
            record.processed_at.as_ref().map(format_ts),
        ],
    )
    .map_err(|e| sqlite_err("insert_correction", e))?;
    Ok(())
}

pub fn get_correction(conn: &Connection, id: &str) -> LoreResult<Option<CorrectionRecord>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM corrections WHERE id = ?1"),
        params![id],
        RawCorrection::from_row,
    )
    .optional()
    .map_err(|e| sqlite_err("get_correction", e))?
    .map(RawCorrection::into_record)
    .transpose()
}

pub fn corrections_by_status(
    conn: &Connection,
    scope: &FeedbackScope,
    status: CorrectionStatus,
) -> LoreResult<Vec<CorrectionRecord>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COLUMNS} FROM corrections
             WHERE tenant_id = ?1 AND domain_id = ?2 AND status = ?3
             ORDER BY created_at, id"
        ))
        .map_err(|e| sqlite_err("corrections_by_status", e))?;
    let rows = stmt
        .query_map(
            params![scope.tenant_id, scope.domain_id, status.as_str()],
            RawCorrection::from_row,
        )
        .map_err(|e| sqlite_err("corrections_by_status", e))?;

    let mut records = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| sqlite_err("corrections_by_status", e))?;
        records.push(raw.into_record()?);
    }
    Ok(records)
}

/// Move a correction from `expected` to `next`. Returns false if the stored
/// status no longer equals `expected`.
pub fn transition_correction(
    conn: &Connection,
    id: &str,
    expected: CorrectionStatus,
    next: CorrectionStatus,
) -> LoreResult<bool> {
    let changed = conn
        .execute(
            "UPDATE corrections SET status = ?3, processed_at = ?4
             WHERE id = ?1 AND status = ?2",
            params![id, expected.as_str(), next.as_str(), format_ts(&Utc::now())],
        )
        .map_err(|e| sqlite_err("transition_correction", e))?;
    Ok(changed == 1)
}
