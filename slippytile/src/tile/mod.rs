//! Tile resolution across the disk and network tiers.
//!
//! [`TileResolver`] owns the disk-then-network policy for raw tile bytes.
//! [`acquire_resource`] puts the in-memory [`ResourceCache`](crate::cache::ResourceCache)
//! in front of it for consumers that hold decoded resources.

mod loader;
mod resolver;

pub use loader::acquire_resource;
pub use resolver::{DiskHit, FetchCode, FetchResult, TileResolver};
