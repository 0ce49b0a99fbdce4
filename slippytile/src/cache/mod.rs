//! Tile caching.
//!
//! Two tiers with different jobs:
//!
//! - [`DiskStore`]: raw tile bytes plus a JSON metadata sidecar per tile,
//!   persisted under a root directory and written atomically.
//! - [`ResourceCache`]: decoded, consumer-owned handles held in memory under a
//!   byte budget with least-recently-used eviction.

mod disk;
mod memory;
mod meta;

pub use disk::{
    DiskConfig, DiskError, DiskStore, DiskUsage, DEFAULT_META_DIR, DEFAULT_RASTER_DIR,
};
pub use memory::{
    DropReleaser, HandleReleaser, ResourceCache, ResourceCacheStats, DEFAULT_BUDGET_BYTES,
};
pub use meta::CacheMeta;
