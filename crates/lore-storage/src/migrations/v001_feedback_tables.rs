//! v001: corrections, training_examples, improvements.

use rusqlite::Connection;

use lore_core::errors::LoreResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> LoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS corrections (
            id                  TEXT PRIMARY KEY,
            tenant_id           TEXT NOT NULL,
            domain_id           TEXT NOT NULL,
            query_text          TEXT NOT NULL,
            incorrect_response  TEXT NOT NULL DEFAULT '',
            corrected_response  TEXT NOT NULL DEFAULT '',
            notes               TEXT NOT NULL DEFAULT '',
            category            TEXT NOT NULL DEFAULT 'other',
            status              TEXT NOT NULL DEFAULT 'pending',
            created_at          TEXT NOT NULL,
            processed_at        TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_corrections_scope_status
            ON corrections(tenant_id, domain_id, status);

        CREATE TABLE IF NOT EXISTS training_examples (
            id                  TEXT PRIMARY KEY,
            correction_id       TEXT NOT NULL UNIQUE,
            tenant_id           TEXT NOT NULL,
            domain_id           TEXT NOT NULL,
            query_pattern       TEXT NOT NULL,
            correct_response    TEXT NOT NULL,
            incorrect_response  TEXT NOT NULL DEFAULT '',
            notes               TEXT NOT NULL DEFAULT '',
            weight              REAL NOT NULL DEFAULT 1.0,
            validation_status   TEXT NOT NULL DEFAULT 'pending',
            usage_count         INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL,
            FOREIGN KEY (correction_id) REFERENCES corrections(id)
        );

        CREATE INDEX IF NOT EXISTS idx_training_scope_status
            ON training_examples(tenant_id, domain_id, validation_status);

        CREATE TABLE IF NOT EXISTS improvements (
            id                    TEXT PRIMARY KEY,
            tenant_id             TEXT NOT NULL,
            domain_id             TEXT NOT NULL,
            kind                  TEXT NOT NULL,
            description           TEXT NOT NULL DEFAULT '',
            training_example_ids  TEXT NOT NULL DEFAULT '[]',
            method                TEXT NOT NULL,
            status                TEXT NOT NULL DEFAULT 'planned',
            ingestion_job_id      TEXT,
            metrics               TEXT,
            error                 TEXT,
            created_at            TEXT NOT NULL,
            updated_at            TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_improvements_status ON improvements(status);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
