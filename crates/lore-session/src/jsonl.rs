//! Append-only JSON-lines session sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use lore_core::errors::StorageError;
use lore_core::models::SessionEvent;
use lore_core::traits::ISessionSink;
use lore_core::LoreResult;

/// Writes one JSON object per line. Only the writer task appends, so no locking.
pub struct JsonlSessionSink {
    path: PathBuf,
}

impl JsonlSessionSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, err: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl ISessionSink for JsonlSessionSink {
    async fn append(&self, event: &SessionEvent) -> LoreResult<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_err(e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.io_err(e))?;
        file.flush().await.map_err(|e| self.io_err(e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lore_core::models::MessageRole;

    #[tokio::test]
    async fn appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlSessionSink::new(dir.path().join("sessions.jsonl"));

        sink.append(&SessionEvent::new("s-1", MessageRole::User, "which table?"))
            .await
            .unwrap();
        sink.append(
            &SessionEvent::new("s-1", MessageRole::Assistant, "orders")
                .with_metadata("query_type", "database"),
        )
        .await
        .unwrap();

        let raw = std::fs::read_to_string(sink.path()).unwrap();
        let events: Vec<SessionEvent> = raw
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].role, MessageRole::User);
        assert_eq!(events[1].metadata["query_type"], "database");
    }

    #[tokio::test]
    async fn missing_directory_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlSessionSink::new(dir.path().join("nope").join("sessions.jsonl"));
        let err = sink
            .append(&SessionEvent::new("s-1", MessageRole::User, "hi"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            lore_core::LoreError::StorageError(StorageError::Io { .. })
        ));
    }
}
