//! Bounded retry with linear backoff for offline store operations.
//!
//! Only transient errors (busy database, unavailable collaborator) are retried.
//! Everything the generalizer retries is idempotent: inserts are keyed on the
//! correction id and status changes are compare-and-set.

use std::time::Duration;

use tracing::warn;

use lore_core::config::LearningConfig;
use lore_core::LoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before attempt `n + 1` is `n * backoff`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&LearningConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &LearningConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    pub async fn run<T, F>(&self, operation: &str, mut f: F) -> LoreResult<T>
    where
        F: FnMut() -> LoreResult<T>,
    {
        let mut attempt = 1;
        loop {
            match f() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(operation, attempt, error = %e, "transient failure, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
