use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{PrepError, Result};

const LOG_FILE_PREFIX: &str = "cluster_viz_prep.log";

/// Daily rotating appender inside `dir`, creating the directory if needed.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    fs::create_dir_all(dir).map_err(|e| PrepError::io(dir, e))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)?;
    Ok(appender)
}

/// Initializes logging: console output on stderr, plus a JSON log file with
/// daily rotation when `log_dir` is given.
///
/// The returned guard must be held until exit so the file writer flushes.
pub fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender(dir)?);
            let layer = fmt::layer().json().with_writer(non_blocking_writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // stdout is reserved for the run summary
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    // Respect RUST_LOG if set; otherwise info for our crate, warn elsewhere
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cluster_viz_prep=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}
