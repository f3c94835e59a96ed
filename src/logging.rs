// 📝 Logging setup
//
// Console mode logs to stderr so stdout stays clean for reports.
// TUI mode logs to a daily rolling file: the terminal belongs to ratatui.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";
pub const LOG_FILE_PREFIX: &str = "domain-portfolio.log";

/// RUST_LOG, then the configured filter, then `info`
pub fn resolve_filter(configured: Option<&str>) -> String {
    std::env::var("RUST_LOG")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global subscriber.
///
/// With `log_dir`, the returned guard must live until exit or buffered lines
/// are lost.
pub fn init(filter: &str, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_new(filter).with_context(|| format!("invalid log filter '{}'", filter))?;

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;

            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!("cannot install log subscriber: {}", e))?;

            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow!("cannot install log subscriber: {}", e))?;

            Ok(None)
        }
    }
}
