//! Tracing setup: structured logging with span definitions and event types.

pub mod events;
pub mod spans;

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lore_core::config::ObservabilityConfig;

static INIT: Once = Once::new();

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "LORE_LOG";

/// Initialize the tracing subscriber.
///
/// `LORE_LOG` (e.g. `LORE_LOG=lore_retrieval=debug,lore_storage=warn`) takes
/// precedence over `config.log_level`. Idempotent.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

        if config.json_logs {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_test_writer())
            .with(EnvFilter::new(filter))
            .init();
    });
}
