//! Disk-then-network tile resolution.
//!
//! [`TileResolver`] answers "give me the bytes for this tile" by probing the
//! [`DiskStore`] first and falling back to the tile server. Successful
//! downloads are written back to disk before they are returned. The
//! conditional variant revalidates cached tiles with `If-None-Match` /
//! `If-Modified-Since` so unchanged tiles cost a 304 instead of a download.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{CacheMeta, DiskStore};
use crate::coord::TileId;
use crate::net::{Conditional, HttpResponse, HttpTransport, RetryingClient, TileEndpoint};

/// How a fetch was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchCode {
    /// Served from the disk store without touching the network.
    HitDisk,
    /// Downloaded and written to the disk store.
    Downloaded,
    /// Server answered 304; the cached bytes are still current.
    NotModified,
    /// Server answered 404.
    NotFound,
    /// Any other status or a transport failure.
    Error,
}

impl FetchCode {
    /// True for outcomes that carry usable tile bytes.
    pub fn is_ok(&self) -> bool {
        matches!(
            self,
            FetchCode::HitDisk | FetchCode::Downloaded | FetchCode::NotModified
        )
    }
}

impl fmt::Display for FetchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchCode::HitDisk => "hit-disk",
            FetchCode::Downloaded => "downloaded",
            FetchCode::NotModified => "not-modified",
            FetchCode::NotFound => "not-found",
            FetchCode::Error => "error",
        };
        f.write_str(name)
    }
}

/// Result of resolving one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub code: FetchCode,
    /// HTTP status of the last network call, 0 if none was made or it failed.
    pub http_status: u16,
    /// Final URL after redirects; empty for disk hits.
    pub effective_url: String,
    pub meta: Option<CacheMeta>,
    /// Raw tile bytes (PNG for raster tiles).
    pub body: Vec<u8>,
}

impl FetchResult {
    /// True if `body` holds usable tile bytes.
    pub fn is_ok(&self) -> bool {
        self.code.is_ok()
    }

    fn failed(code: FetchCode, response: HttpResponse) -> Self {
        Self {
            code,
            http_status: response.status,
            effective_url: response.effective_url,
            meta: None,
            body: Vec::new(),
        }
    }
}

/// Raster bytes and optional metadata found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskHit {
    pub body: Vec<u8>,
    pub meta: Option<CacheMeta>,
}

/// Resolves tiles through the disk store and the tile server.
///
/// Network requests for different tiles may run in parallel from several
/// threads; disk access from all of them is serialized by one lock.
pub struct TileResolver<T: HttpTransport> {
    disk: Arc<DiskStore>,
    client: RetryingClient<T>,
    endpoint: TileEndpoint,
    disk_lock: Mutex<()>,
}

impl<T: HttpTransport> TileResolver<T> {
    pub fn new(disk: Arc<DiskStore>, client: RetryingClient<T>, endpoint: TileEndpoint) -> Self {
        Self {
            disk,
            client,
            endpoint,
            disk_lock: Mutex::new(()),
        }
    }

    pub fn disk(&self) -> &Arc<DiskStore> {
        &self.disk
    }

    pub fn client(&self) -> &RetryingClient<T> {
        &self.client
    }

    pub fn endpoint(&self) -> &TileEndpoint {
        &self.endpoint
    }

    /// Read-only disk probe; never touches the network.
    pub fn try_load_from_disk(&self, id: &TileId) -> Option<DiskHit> {
        let _guard = self.disk_lock.lock();
        let body = self.disk.load_raster(id)?;
        let meta = self.disk.load_meta(id);
        Some(DiskHit { body, meta })
    }

    /// Returns the tile from disk if present, downloading it otherwise.
    pub fn ensure_raster(&self, id: &TileId) -> FetchResult {
        if let Some(hit) = self.try_load_from_disk(id) {
            debug!(tile = %id, "Disk hit");
            return FetchResult {
                code: FetchCode::HitDisk,
                http_status: 0,
                effective_url: String::new(),
                meta: hit.meta,
                body: hit.body,
            };
        }

        let url = self.endpoint.raster_url(id);
        let response = self.client.get(&url, None, None);
        self.complete(id, &url, response)
    }

    /// Revalidates a cached tile with the server.
    ///
    /// Without cached metadata this is exactly [`TileResolver::ensure_raster`].
    /// On 304 the cached bytes are returned and nothing is written to disk.
    pub fn ensure_raster_conditional(&self, id: &TileId) -> FetchResult {
        let (cached_body, cached_meta) = match self.try_load_from_disk(id) {
            Some(DiskHit {
                body,
                meta: Some(meta),
            }) => (body, meta),
            _ => return self.ensure_raster(id),
        };

        let conditional = Conditional {
            if_none_match: cached_meta.etag.clone(),
            if_modified_since: cached_meta.last_modified.clone(),
        };

        let url = self.endpoint.raster_url(id);
        let response = self.client.get(&url, None, Some(&conditional));

        if response.status == 304 {
            debug!(tile = %id, "Not modified");
            return FetchResult {
                code: FetchCode::NotModified,
                http_status: response.status,
                effective_url: response.effective_url,
                meta: Some(cached_meta),
                body: cached_body,
            };
        }

        self.complete(id, &url, response)
    }

    /// Maps a non-304 response to a result, persisting 200 bodies.
    fn complete(&self, id: &TileId, url: &str, response: HttpResponse) -> FetchResult {
        match response.status {
            200 => {
                let meta = CacheMeta::from_headers(&response.headers, unix_now());
                {
                    let _guard = self.disk_lock.lock();
                    if let Err(e) = self.disk.save_raster(id, &response.body, Some(&meta)) {
                        warn!(tile = %id, error = %e, "Failed to persist downloaded tile");
                    }
                }
                info!(tile = %id, bytes = response.body.len(), "Downloaded tile");

                FetchResult {
                    code: FetchCode::Downloaded,
                    http_status: response.status,
                    effective_url: response.effective_url,
                    meta: Some(meta),
                    body: response.body,
                }
            }
            404 => {
                warn!(tile = %id, url, "Tile not found");
                FetchResult::failed(FetchCode::NotFound, response)
            }
            status => {
                warn!(tile = %id, url, status, "HTTP error");
                FetchResult::failed(FetchCode::Error, response)
            }
        }
    }
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
