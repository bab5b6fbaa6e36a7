//! Tracing subscriber setup.
//!
//! Logs go to stderr, and optionally also to `nighttrain.log` in a log
//! directory through a non-blocking writer. The filter honours `RUST_LOG`
//! and otherwise defaults to `nighttrain=info` (`debug` when verbose).
//!
//! ```ignore
//! let _guard = nighttrain::logging::init_logging(&LogOptions::default().verbose(true))?;
//! ```
//!
//! Keep the returned guard alive for the lifetime of the program; dropping
//! it flushes and closes the log file.

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "nighttrain.log";

/// Errors from logging setup.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A global logger is already installed")]
    AlreadyInitialized,
}

/// Options for [`init_logging`].
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub verbose: bool,
    /// Also write to `LOG_FILE_NAME` in this directory.
    pub log_dir: Option<PathBuf>,
}

impl LogOptions {
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Filter directive used when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> &'static str {
        if self.verbose {
            "nighttrain=debug"
        } else {
            "nighttrain=info"
        }
    }
}

/// Keeps the file writer alive.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
pub fn init_logging(options: &LogOptions) -> Result<LoggingGuard, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_directive()));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::rfc_3339())
        .with_target(options.verbose);

    let (file_layer, file_guard) = match &options.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
                path: dir.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::rfc_3339());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    if let Some(dir) = &options.log_dir {
        tracing::debug!(path = %dir.join(LOG_FILE_NAME).display(), "File logging enabled");
    }

    Ok(LoggingGuard { _file: file_guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(LogOptions::default().default_directive(), "nighttrain=info");
        assert_eq!(
            LogOptions::default().verbose(true).default_directive(),
            "nighttrain=debug"
        );
    }

    #[test]
    fn test_log_dir_option() {
        let options = LogOptions::default().with_log_dir("/tmp/nt-logs");
        assert_eq!(options.log_dir, Some(PathBuf::from("/tmp/nt-logs")));
    }
}
