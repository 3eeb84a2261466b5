//! Tracing setup for the `rps` binary.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Platform cache directory for run logs.
///
/// - macOS: `~/Library/Caches/rps/logs`
/// - Linux: `~/.cache/rps/logs` (or `$XDG_CACHE_HOME/rps/logs`)
/// - Windows: `%LOCALAPPDATA%\rps\logs`
/// - Fallback: `/tmp/rps/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "rps")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/rps"))
        .join("logs")
}

/// Log to stderr and to `<log_dir>/run_<timestamp>/client.log`.
///
/// `RUST_LOG` selects the filter (default `info`). Keep the returned guard
/// alive until exit so buffered file output is flushed.
pub fn setup_logging() -> Result<(WorkerGuard, PathBuf)> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let run_dir = log_dir().join(format!("run_{timestamp}"));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create log directory {}", run_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&run_dir, "client.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    let log_file = run_dir.join("client.log");
    tracing::debug!(log_file = %log_file.display(), "Logging initialized");
    Ok((guard, log_file))
}
