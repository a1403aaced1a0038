//! Logging setup: stdout plus an append-only log file.
//!
//! `RUST_LOG` takes precedence over the configured level. Without it the
//! SMTP client is held at `warn` so protocol chatter stays out of the log.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{RelayError, Result};

/// Directives appended to the configured level.
const QUIET_TARGETS: &str = "lettre=warn";

/// Parse a configured level name. Unknown names yield `None`.
fn parse_level(level: &str) -> Option<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Filter directives used when `RUST_LOG` is unset.
fn default_directives(level: Level) -> String {
    format!("{},{}", level.as_str().to_lowercase(), QUIET_TARGETS)
}

fn build_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Open the log file for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Initialize logging to stdout and the configured log file.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let level = parse_level(&config.level);
    let log_file = Arc::new(open_log_file(Path::new(&config.file))?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.and(log_file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(build_filter(level.unwrap_or(Level::INFO)))
        .try_init()
        .map_err(|e| RelayError::Config(format!("logging already initialized: {e}")))?;

    tracing::info!(file = %config.file, level = %config.level, "Logging initialized");
    if level.is_none() {
        tracing::warn!(level = %config.level, "Unknown log level, using info");
    }
    Ok(())
}

/// Initialize console-only logging.
///
/// Used when the log file cannot be opened. Does nothing if a subscriber is
/// already installed.
pub fn init_console_only(level: &str) {
    let filter = build_filter(parse_level(level).unwrap_or(Level::INFO));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_target(true),
        )
        .with(filter)
        .try_init();
}
