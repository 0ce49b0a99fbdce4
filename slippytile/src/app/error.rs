//! Application error types.

use std::fmt;

use crate::cache::DiskError;
use crate::config::ConfigError;
use crate::net::NetError;

/// Errors that can occur while bootstrapping the application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to set up the disk store.
    Disk(DiskError),

    /// Failed to create the network transport.
    Network(NetError),

    /// Configuration error.
    Config(ConfigError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Disk(e) => write!(f, "Failed to open disk store: {}", e),
            AppError::Network(e) => write!(f, "Failed to initialize network: {}", e),
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Disk(e) => Some(e),
            AppError::Network(e) => Some(e),
            AppError::Config(e) => Some(e),
        }
    }
}

impl From<DiskError> for AppError {
    fn from(e: DiskError) -> Self {
        AppError::Disk(e)
    }
}

impl From<NetError> for AppError {
    fn from(e: NetError) -> Self {
        AppError::Network(e)
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}
