use anyhow::{Context, Result};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File named by this variable receives the log. Unset means no logging,
/// since the TUI owns the terminal.
const LOG_PATH_ENV: &str = "DIFFER_LOG";
/// Optional `EnvFilter` directives, e.g. `differ=trace`.
const LOG_FILTER_ENV: &str = "DIFFER_LOG_FILTER";

pub fn init_tracing() -> Result<()> {
    let log_path = match std::env::var_os(LOG_PATH_ENV) {
        Some(path) => PathBuf::from(path),
        None => return Ok(()),
    };

    let file = File::options()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new("differ=debug"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}
