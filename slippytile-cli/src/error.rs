//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use slippytile::app::AppError;
use slippytile::cache::DiskError;
use slippytile::config::ConfigError;
use slippytile::coord::CoordError;
use slippytile::logging::LoggingError;

/// Errors reported to the user before exiting with a failure status.
#[derive(Debug)]
pub enum CliError {
    /// Bad or unloadable configuration.
    Config(ConfigError),

    /// Application bootstrap failed.
    App(AppError),

    /// Logging could not be set up.
    Logging(LoggingError),

    /// Coordinates outside the Web Mercator range.
    Coordinates(CoordError),

    /// Tile address outside the grid for its zoom.
    InvalidTile(String),

    /// Tile could not be resolved.
    Fetch(String),

    /// Disk store operation failed.
    Disk(DiskError),

    /// Writing an output file failed.
    Output {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::App(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Coordinates(e) => write!(f, "Invalid coordinates: {}", e),
            CliError::InvalidTile(msg) => write!(f, "Invalid tile: {}", msg),
            CliError::Fetch(msg) => write!(f, "Fetch failed: {}", msg),
            CliError::Disk(e) => write!(f, "Disk cache error: {}", e),
            CliError::Output { path, source } => {
                write!(f, "Failed to write {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::App(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Coordinates(e) => Some(e),
            CliError::Disk(e) => Some(e),
            CliError::Output { source, .. } => Some(source),
            CliError::InvalidTile(_) | CliError::Fetch(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<AppError> for CliError {
    fn from(e: AppError) -> Self {
        CliError::App(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<CoordError> for CliError {
    fn from(e: CoordError) -> Self {
        CliError::Coordinates(e)
    }
}

impl From<DiskError> for CliError {
    fn from(e: DiskError) -> Self {
        CliError::Disk(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_cause() {
        let err = CliError::from(CoordError::InvalidLatitude(91.0));
        assert!(err.to_string().starts_with("Invalid coordinates"));
        assert!(err.to_string().contains("91"));
    }

    #[test]
    fn test_fetch_error_has_no_source() {
        use std::error::Error;
        let err = CliError::Fetch("12/1/1: not-found (HTTP 404)".to_string());
        assert!(err.source().is_none());
    }
}
