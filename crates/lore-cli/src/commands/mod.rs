//! Command handlers. Each returns an exit code; errors are printed here, not propagated.

pub mod ask;
pub mod feedback;
pub mod schema;

use std::path::Path;

use anyhow::Context;

use lore_core::LoreConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CliExitCode {
    Success = 0,
    Failed = 1,
    Config = 2,
}

/// Load the config file (or defaults) and fold the verbosity flag into the log level.
pub fn load_config(path: Option<&Path>, verbose: u8) -> anyhow::Result<LoreConfig> {
    let mut config = match path {
        Some(path) => LoreConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => LoreConfig::default(),
    };
    match verbose {
        0 => {}
        1 => config.observability.log_level = "info".to_string(),
        2 => config.observability.log_level = "debug".to_string(),
        _ => config.observability.log_level = "trace".to_string(),
    }
    Ok(config)
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Report a failed command on stderr and map it to an exit code.
pub(crate) fn finish(result: anyhow::Result<()>) -> CliExitCode {
    match result {
        Ok(()) => CliExitCode::Success,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "command failed");
            match e.downcast_ref::<lore_core::LoreError>() {
                Some(lore) => eprintln!("{}", lore.user_message()),
                None => eprintln!("error: {e:#}"),
            }
            CliExitCode::Failed
        }
    }
}
