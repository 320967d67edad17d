/// Storage-layer errors for the feedback record store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("database busy during {operation}")]
    Busy { operation: String },

    #[error("corrupt row in {table}: {details}")]
    CorruptRow { table: String, details: String },

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },
}

impl StorageError {
    /// Busy/locked databases clear up on their own; everything else is permanent.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Busy { .. })
    }
}
