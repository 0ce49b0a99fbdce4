//! Application configuration.
//!
//! `AppConfig` gathers everything [`App::bootstrap`](super::App::bootstrap)
//! needs in one value, so front ends translate their own settings once and
//! hand the result over.

use std::path::PathBuf;

use crate::cache::{DiskConfig, DEFAULT_BUDGET_BYTES};
use crate::config::ConfigFile;
use crate::net::{NetConfig, TileEndpoint};

/// Top-level configuration for [`App`](super::App).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Disk store location and layout.
    pub disk: DiskConfig,

    /// Transport and retry settings.
    pub net: NetConfig,

    /// Tile server.
    pub endpoint: TileEndpoint,

    /// Budget for resource caches created through the app.
    pub memory_budget_bytes: usize,
}

impl AppConfig {
    /// Creates a config with default network, endpoint and memory settings.
    ///
    /// # Arguments
    ///
    /// * `cache_dir` - Root directory of the disk store
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            disk: DiskConfig::new(cache_dir),
            net: NetConfig::default(),
            endpoint: TileEndpoint::default(),
            memory_budget_bytes: DEFAULT_BUDGET_BYTES,
        }
    }

    /// Creates application config from the configuration file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            disk: config.disk_config(),
            net: config.network.clone(),
            endpoint: config.endpoint.clone(),
            memory_budget_bytes: config.cache.memory_budget,
        }
    }

    /// Points the disk store at another root, keeping subdirectory names.
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.disk.root = cache_dir.into();
        self
    }

    /// Set the tile server.
    pub fn with_endpoint(mut self, endpoint: TileEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Set the resource cache budget.
    pub fn with_memory_budget(mut self, bytes: usize) -> Self {
        self.memory_budget_bytes = bytes;
        self
    }
}
