//! SQL operations grouped by record type. Every function takes a borrowed
//! connection so the engine decides locking.

pub mod correction_ops;
pub mod improvement_ops;
pub mod training_ops;

use chrono::{DateTime, Utc};

use lore_core::errors::{LoreResult, StorageError};

pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub(crate) fn parse_ts(table: &str, raw: &str) -> LoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            StorageError::CorruptRow {
                table: table.to_string(),
                details: format!("bad timestamp '{raw}': {e}"),
            }
            .into()
        })
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(table: &str, raw: &str) -> LoreResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        StorageError::CorruptRow {
            table: table.to_string(),
            details: format!("bad json column: {e}"),
        }
        .into()
    })
}
