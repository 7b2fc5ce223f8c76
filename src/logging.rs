use anyhow::Result;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `debug`, `tasktick=trace`)
pub const LOG_ENV: &str = "TASKTICK_LOG";

pub const LOG_FILE: &str = "tasktick.log";

/// Send logs to `<data_dir>/tasktick.log`; the terminal belongs to the TUI.
///
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init_logging(data_dir: &Path) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let appender = tracing_appender::rolling::never(data_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(guard)
}
