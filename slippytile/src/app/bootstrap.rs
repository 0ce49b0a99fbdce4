//! Application bootstrap implementation.
//!
//! `App` wires the components in dependency order: one network transport for
//! the whole process, then the disk store, then the resolver that uses both.
//! Everything downstream borrows from the app instead of building its own.

use std::sync::Arc;

use tracing::info;

use super::config::AppConfig;
use super::error::AppError;
use crate::cache::{DiskStore, HandleReleaser, ResourceCache};
use crate::net::{HttpTransport, ReqwestTransport, RetryingClient};
use crate::tile::TileResolver;

/// Bootstrapped tile stack.
pub struct App<T: HttpTransport = ReqwestTransport> {
    config: AppConfig,
    disk: Arc<DiskStore>,
    resolver: TileResolver<T>,
}

impl App<ReqwestTransport> {
    /// Builds the application with the real HTTP transport.
    ///
    /// The transport is created exactly once here; its connection pool and
    /// TLS setup are shared by every request made through the app.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be built or the disk store
    /// configuration is unusable.
    pub fn bootstrap(config: AppConfig) -> Result<Self, AppError> {
        let transport = ReqwestTransport::new(&config.net)?;
        Self::with_transport(config, transport)
    }
}

impl<T: HttpTransport> App<T> {
    /// Builds the application around a caller-supplied transport.
    pub fn with_transport(config: AppConfig, transport: T) -> Result<Self, AppError> {
        let disk = Arc::new(DiskStore::new(config.disk.clone())?);
        info!(
            root = %config.disk.root.display(),
            "Disk store ready"
        );

        let client = RetryingClient::new(transport, config.net.clone());
        let resolver = TileResolver::new(Arc::clone(&disk), client, config.endpoint.clone());
        info!(
            endpoint = config.endpoint.base_url(),
            max_retries = config.net.max_retries,
            "Tile resolver ready"
        );

        Ok(Self {
            config,
            disk,
            resolver,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Shared disk store.
    pub fn disk(&self) -> &Arc<DiskStore> {
        &self.disk
    }

    pub fn resolver(&self) -> &TileResolver<T> {
        &self.resolver
    }

    /// Creates an empty resource cache with the configured budget, releasing
    /// handles through `releaser`.
    pub fn resource_cache_with<H, R: HandleReleaser<H>>(&self, releaser: R) -> ResourceCache<H, R> {
        ResourceCache::with_releaser(self.config.memory_budget_bytes, releaser)
    }
}
