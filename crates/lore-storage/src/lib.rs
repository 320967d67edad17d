//! # lore-storage
//!
//! Persistence for correction records, training examples, and improvement
//! records. `SqliteFeedbackStore` is the durable backend; `MemoryFeedbackStore`
//! serves tests and single-process deployments.

pub mod engine;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::SqliteFeedbackStore;
pub use memory::MemoryFeedbackStore;

use lore_core::errors::{LoreError, StorageError};

/// Map a SQLite failure message into a storage error.
pub fn to_storage_err(message: String) -> LoreError {
    StorageError::SqliteError { message }.into()
}

/// Map a rusqlite error, keeping busy/locked databases distinguishable so callers can retry.
pub fn sqlite_err(operation: &str, err: rusqlite::Error) -> LoreError {
    match err.sqlite_error_code() {
        Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
            StorageError::Busy {
                operation: operation.to_string(),
            }
            .into()
        }
        _ => to_storage_err(format!("{operation}: {err}")),
    }
}
