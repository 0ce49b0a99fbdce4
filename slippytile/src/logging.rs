//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; binaries call [`init`] once at
//! startup to decide where they go. `RUST_LOG` takes precedence over the
//! configured level when set.
//!
//! ```ignore
//! let guard = slippytile::logging::init(&LoggingConfig::default())?;
//! tracing::info!("ready");
//! drop(guard); // flushes the file writer
//! ```

use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, EnvFilter};

/// Default log file name inside [`LoggingConfig::directory`].
pub const DEFAULT_LOG_FILE: &str = "slippytile.log";

/// Accepted values for [`LoggingConfig::level`].
pub const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Where log output goes and how much of it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter level, one of [`LEVELS`].
    pub level: String,
    /// Directory for a log file in addition to stderr; `None` logs to stderr only.
    pub directory: Option<PathBuf>,
    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_name: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

/// Errors installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// Installs the global subscriber.
///
/// Returns the file writer's guard when a log directory is configured; keep
/// it alive until shutdown or buffered lines are lost.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::rfc_3339())
        .with_target(false);

    let Some(dir) = &config.directory else {
        tracing_subscriber::registry()
            .with(build_filter(config))
            .with(console)
            .try_init()?;
        return Ok(None);
    };

    fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    let appender = tracing_appender::rolling::never(dir, &config.file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(LocalTime::rfc_3339());

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(console)
        .with(file)
        .try_init()?;
    Ok(Some(guard))
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(config.level.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.directory.is_none());
        assert_eq!(config.file_name, DEFAULT_LOG_FILE);
    }

    #[test]
    fn test_file_logging_then_second_init_fails() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("logs");
        let config = LoggingConfig {
            level: "debug".to_string(),
            directory: Some(dir.clone()),
            ..LoggingConfig::default()
        };

        let guard = init(&config).unwrap();
        assert!(guard.is_some());
        tracing::info!(tile = "1/0/0", "logging test line");
        drop(guard);

        let written = fs::read_to_string(dir.join(DEFAULT_LOG_FILE)).unwrap();
        assert!(written.contains("logging test line"));

        let again = init(&LoggingConfig::default());
        assert!(matches!(again, Err(LoggingError::AlreadyInitialized(_))));
    }
}
