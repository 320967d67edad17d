//! Versioned schema migrations, applied in order and recorded in `schema_version`.

mod v001_feedback_tables;

use rusqlite::Connection;
use tracing::info;

use lore_core::errors::{LoreResult, StorageError};

type Migration = fn(&Connection) -> LoreResult<()>;

const MIGRATIONS: &[(u32, Migration)] = &[(1, v001_feedback_tables::migrate)];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 1;

/// Apply every migration newer than the recorded schema version.
pub fn run_migrations(conn: &Connection) -> LoreResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| migration_err(0, e))?;

    let current = current_version(conn)?;
    for (version, migrate) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        migrate(conn).map_err(|e| StorageError::MigrationFailed {
            version: *version,
            reason: e.to_string(),
        })?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| migration_err(*version, e))?;
        info!(version, "applied feedback schema migration");
    }
    current_version(conn)
}

pub fn current_version(conn: &Connection) -> LoreResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| migration_err(0, e))
}

fn migration_err(version: u32, e: rusqlite::Error) -> lore_core::LoreError {
    StorageError::MigrationFailed {
        version,
        reason: e.to_string(),
    }
    .into()
}
