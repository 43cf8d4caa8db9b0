use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Route `tracing` output to `log_file`. Keep the returned guard alive
/// for the whole run so buffered lines are flushed on exit.
pub fn init(log_file: &Path) -> Result<WorkerGuard> {
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;
    let file_name = log_file
        .file_name()
        .with_context(|| format!("Log path {} has no file name", log_file.display()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (file_nb, guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .try_init()
        .context("Could not install the log subscriber")?;
    Ok(guard)
}
