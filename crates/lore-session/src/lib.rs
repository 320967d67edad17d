//! # lore-session
//!
//! Session events leave the response path through a bounded channel. A
//! background writer drains the channel into an `ISessionSink`. Emitting never
//! blocks: when the channel is full (or the writer is gone) the event is
//! dropped with a warning.

mod jsonl;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use lore_core::config::SessionConfig;
use lore_core::models::SessionEvent;
use lore_core::traits::ISessionSink;
use lore_observability::tracing_setup::events;

pub use jsonl::JsonlSessionSink;

/// Cloneable sending half of the side channel.
#[derive(Clone)]
pub struct SessionEmitter {
    sender: mpsc::Sender<SessionEvent>,
    dropped: Arc<AtomicU64>,
}

impl SessionEmitter {
    /// Queue an event. Returns false if it was dropped.
    pub fn emit(&self, event: SessionEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                events::session_event_dropped(&event.session_id, "channel full");
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                events::session_event_dropped(&event.session_id, "writer stopped");
                false
            }
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Handle to the background writer. Dropping every emitter lets it finish.
pub struct SessionWriter {
    handle: JoinHandle<u64>,
}

impl SessionWriter {
    /// Wait for the writer to drain; returns the number of events persisted.
    pub async fn finish(self) -> u64 {
        self.handle.await.unwrap_or(0)
    }
}

/// Start a writer task. Must be called inside a tokio runtime.
pub fn spawn_session_writer(
    sink: Arc<dyn ISessionSink>,
    config: &SessionConfig,
) -> (SessionEmitter, SessionWriter) {
    let (sender, mut receiver) = mpsc::channel::<SessionEvent>(config.channel_capacity.max(1));
    let handle = tokio::spawn(async move {
        let mut written = 0u64;
        while let Some(event) = receiver.recv().await {
            match sink.append(&event).await {
                Ok(()) => written += 1,
                Err(e) => warn!(
                    session_id = %event.session_id,
                    error = %e,
                    "session sink rejected event"
                ),
            }
        }
        debug!(written, "session writer finished");
        written
    });

    (
        SessionEmitter {
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        SessionWriter { handle },
    )
}
