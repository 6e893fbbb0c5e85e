//! Log output setup.
//!
//! Library code only emits `tracing` events. Binaries call [`init`] once to
//! route them to a daily log file (`ldap.YYYY-MM-DD.log` under
//! [`LogConfig::path`]) and, in debug mode, to stderr.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;
use crate::error::{DirectoryError, DirectoryResult};

/// File name prefix of log files.
pub const LOG_FILE_PREFIX: &str = "ldap";

/// Creates the daily rolling appender for `log.path`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn file_appender(log: &LogConfig) -> DirectoryResult<RollingFileAppender> {
    std::fs::create_dir_all(&log.path).map_err(|e| {
        DirectoryError::config(format!("cannot create log directory {}: {e}", log.path.display()))
    })?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(&log.path)
        .map_err(|e| DirectoryError::config(format!("cannot open log file: {e}")))
}

/// Installs the global subscriber.
///
/// The level comes from `RUST_LOG` (default `info`). Returns the guard
/// that flushes the file writer; keep it alive for the program's lifetime.
///
/// # Errors
///
/// Returns an error if the log directory is unusable or a subscriber is
/// already installed.
pub fn init(log: &LogConfig) -> DirectoryResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = if log.enable {
        let (writer, guard) = tracing_appender::non_blocking(file_appender(log)?);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let stderr_layer = log
        .debug
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| DirectoryError::config(format!("logging already initialised: {e}")))?;

    Ok(guard)
}
