//! Structured logging for terview using the tracing crate.
//!
//! Logs go to daily-rotated files under the XDG state directory, never to
//! the terminal (the TUI owns it). Old log files are pruned at startup,
//! keeping the last week.

use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Days of rotated log files kept on disk.
const KEEP_DAYS: usize = 7;

/// Keeps the non-blocking appender alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes file-based logging.
///
/// Log level comes from RUST_LOG (default "info").
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> Result<(), anyhow::Error> {
    let log_dir = log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    if let Err(e) = prune_old_logs(&log_dir) {
        eprintln!("Warning: Failed to prune old logs: {e}");
    }

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&log_dir, "terview.log"));
    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false),
        )
        .init();

    tracing::debug!("Logging initialized. Log directory: {}", log_dir.display());
    Ok(())
}

/// Log directory per the XDG Base Directory Specification:
/// $XDG_STATE_HOME/terview, falling back to ~/.local/state/terview.
pub(crate) fn log_directory() -> Result<PathBuf, anyhow::Error> {
    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg_state).join("terview"));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".local/state/terview"))
}

/// Deletes rotated log files beyond the newest `KEEP_DAYS`.
///
/// The daily appender names files `terview.log.YYYY-MM-DD`, so sorting the
/// names descending sorts them newest-first.
fn prune_old_logs(log_dir: &PathBuf) -> Result<(), anyhow::Error> {
    let mut dated: Vec<PathBuf> = std::fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_str()?;
            name.strip_prefix("terview.log.")
                .filter(|suffix| suffix.len() == 10)
                .map(|_| path.clone())
        })
        .collect();

    dated.sort();
    dated.reverse();

    for path in dated.iter().skip(KEEP_DAYS) {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!("Failed to delete old log file {}: {}", path.display(), e);
        }
    }

    Ok(())
}
