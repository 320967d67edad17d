use async_trait::async_trait;

use crate::errors::LoreResult;
use crate::models::SessionEvent;

/// Chat history persistence. Called off the response path.
#[async_trait]
pub trait ISessionSink: Send + Sync {
    async fn append(&self, event: &SessionEvent) -> LoreResult<()>;
}
