//! Debug logging support for sedrun
//!
//! When debug mode is enabled via config or `--debug`, engine activity is
//! logged to ~/.sedrun/sedrun.log.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

const LOG_FILE_NAME: &str = "sedrun.log";

/// Initialize the debug logging system
///
/// If `debug_enabled` is true, sets up file logging filtered by `level`.
/// Returns the path to the log file, or None if logging is not enabled or
/// could not be set up.
pub fn init_debug_logging(debug_enabled: bool, level: &str) -> Option<PathBuf> {
    if !debug_enabled {
        return None;
    }
    init_logging_in(get_log_dir(), level)
}

/// Logging must never stop a run: any failure is reported and skipped
fn init_logging_in(log_dir: Result<PathBuf>, level: &str) -> Option<PathBuf> {
    let result = log_dir.and_then(|dir| {
        init_file_logging(&dir, level)?;
        Ok(dir.join(LOG_FILE_NAME))
    });

    match result {
        Ok(path) => Some(path),
        Err(e) => {
            eprintln!("Warning: Could not set up debug log: {:#}", e);
            None
        }
    }
}

fn init_file_logging(log_dir: &Path, level: &str) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log filter: {}", level))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(log_dir)
        .with_context(|| format!("Failed to open log file in {}", log_dir.display()))?;

    let subscriber = registry()
        .with(
            fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

/// Directory holding the debug log
fn get_log_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home_dir.join(".sedrun"))
}

/// Get the log file path without initializing logging
pub fn get_current_log_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".sedrun").join(LOG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from("~/.sedrun/sedrun.log"))
}
