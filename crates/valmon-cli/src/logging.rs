//! Tracing setup: console plus `log.txt`.
//!
//! Each run starts a fresh `log.txt`; the previous run's file is kept as
//! `log.old.txt`. Level is controlled by `RUST_LOG` (default: info).

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE: &str = "log.txt";
pub const PREVIOUS_LOG_FILE: &str = "log.old.txt";

/// Move `log.txt` to `log.old.txt`, replacing any older copy.
pub fn rotate_log(dir: &Path) -> io::Result<()> {
    let current = dir.join(LOG_FILE);
    if !current.exists() {
        return Ok(());
    }
    let previous = dir.join(PREVIOUS_LOG_FILE);
    if previous.exists() {
        fs::remove_file(&previous)?;
    }
    fs::rename(current, previous)
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; hold it for the
/// lifetime of the program.
pub fn init_tracing(dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    rotate_log(dir).with_context(|| format!("Failed to rotate {}", dir.join(LOG_FILE).display()))?;

    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stdout)
                .compact(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .compact(),
        )
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(guard)
}
