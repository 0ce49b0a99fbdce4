//! Tile acquisition for renderers.
//!
//! Chains the three tiers a consumer walks through on every frame: the
//! in-memory [`ResourceCache`], then the [`TileResolver`] (disk, then
//! network), then a caller-supplied decoder that turns raw bytes into a
//! resource handle.

use tracing::debug;

use crate::cache::{HandleReleaser, ResourceCache};
use crate::coord::TileId;
use crate::net::HttpTransport;

use super::resolver::TileResolver;

/// Returns the resource handle for `id`, loading and decoding it on a miss.
///
/// `decode` receives the raw tile bytes and returns the handle together with
/// its size in bytes for budget accounting. `None` from either the resolver
/// or the decoder yields `None`; the caller draws its placeholder instead.
pub fn acquire_resource<'c, H, R, T, F>(
    cache: &'c mut ResourceCache<H, R>,
    resolver: &TileResolver<T>,
    id: &TileId,
    decode: F,
) -> Option<&'c H>
where
    R: HandleReleaser<H>,
    T: HttpTransport,
    F: FnOnce(&[u8]) -> Option<(H, usize)>,
{
    if cache.get(id).is_some() {
        return cache.peek(id);
    }

    let fetched = resolver.ensure_raster(id);
    if !fetched.is_ok() {
        debug!(tile = %id, code = %fetched.code, "No tile bytes available");
        return None;
    }

    let Some((handle, size_bytes)) = decode(&fetched.body) else {
        debug!(tile = %id, bytes = fetched.body.len(), "Tile decode failed");
        return None;
    };

    cache.put(*id, handle, size_bytes);
    cache.peek(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DiskConfig, DiskStore};
    use crate::net::{MockTransport, NetConfig, RetryingClient, TileEndpoint};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_resolver(transport: MockTransport) -> (TempDir, TileResolver<MockTransport>) {
        let temp = TempDir::new().unwrap();
        let disk = Arc::new(DiskStore::new(DiskConfig::new(temp.path())).unwrap());
        let config = NetConfig {
            max_retries: 0,
            retry_backoff_first: Duration::ZERO,
            retry_backoff_subsequent: Duration::ZERO,
            ..NetConfig::default()
        };
        let resolver = TileResolver::new(
            disk,
            RetryingClient::new(transport, config),
            TileEndpoint::new("http://tiles.test"),
        );
        (temp, resolver)
    }

    /// Decodes to the byte sum, sized by body length.
    fn sum_decoder(bytes: &[u8]) -> Option<(u32, usize)> {
        Some((bytes.iter().map(|&b| u32::from(b)).sum(), bytes.len()))
    }

    #[test]
    fn test_miss_resolves_decodes_and_inserts() {
        let (_temp, resolver) = create_resolver(MockTransport::always(200, vec![1, 2, 3]));
        let mut cache = ResourceCache::new(1_000);
        let id = TileId::new(3, 1, 1);

        let handle = acquire_resource(&mut cache, &resolver, &id, sum_decoder).copied();

        assert_eq!(handle, Some(6));
        assert!(cache.contains(&id));
        assert_eq!(cache.used_bytes(), 3);
        assert_eq!(cache.miss_count(), 1);
        assert!(resolver.disk().exists(&id));
    }

    #[test]
    fn test_hit_skips_resolver_and_decoder() {
        let (_temp, resolver) = create_resolver(MockTransport::always(200, vec![1]));
        let mut cache = ResourceCache::new(1_000);
        let id = TileId::new(3, 1, 1);
        cache.put(id, 99u32, 10);

        let handle = acquire_resource(&mut cache, &resolver, &id, |_| -> Option<(u32, usize)> {
            panic!("decoder must not run on a hit")
        })
        .copied();

        assert_eq!(handle, Some(99));
        assert_eq!(cache.hit_count(), 1);
        assert_eq!(resolver.client().transport().call_count(), 0);
    }

    #[test]
    fn test_second_acquire_is_a_hit() {
        let (_temp, resolver) = create_resolver(MockTransport::always(200, vec![4, 4]));
        let mut cache = ResourceCache::new(1_000);
        let id = TileId::new(2, 0, 1);

        acquire_resource(&mut cache, &resolver, &id, sum_decoder);
        let handle = acquire_resource(&mut cache, &resolver, &id, sum_decoder).copied();

        assert_eq!(handle, Some(8));
        assert_eq!(cache.hit_count(), 1);
        assert_eq!(cache.miss_count(), 1);
        assert_eq!(resolver.client().transport().call_count(), 1);
    }

    #[test]
    fn test_not_found_yields_none() {
        let (_temp, resolver) = create_resolver(MockTransport::always(404, Vec::new()));
        let mut cache = ResourceCache::new(1_000);
        let id = TileId::new(2, 0, 1);

        assert_eq!(acquire_resource(&mut cache, &resolver, &id, sum_decoder), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_decode_failure_yields_none() {
        let (_temp, resolver) = create_resolver(MockTransport::always(200, b"not a png".to_vec()));
        let mut cache: ResourceCache<u32> = ResourceCache::new(1_000);
        let id = TileId::new(2, 0, 1);

        let handle = acquire_resource(&mut cache, &resolver, &id, |_| None);

        assert_eq!(handle, None);
        assert!(cache.is_empty());
        // The raw bytes are still on disk for the next attempt
        assert!(resolver.disk().exists(&id));
    }

    #[test]
    fn test_served_from_disk_when_memory_evicted() {
        let (_temp, resolver) = create_resolver(MockTransport::always(200, vec![5; 10]));
        let mut cache = ResourceCache::new(10);
        let a = TileId::new(4, 0, 0);
        let b = TileId::new(4, 1, 0);

        acquire_resource(&mut cache, &resolver, &a, sum_decoder);
        acquire_resource(&mut cache, &resolver, &b, sum_decoder);
        assert!(!cache.contains(&a));

        let handle = acquire_resource(&mut cache, &resolver, &a, sum_decoder).copied();

        assert_eq!(handle, Some(50));
        assert_eq!(resolver.client().transport().call_count(), 2);
    }
}
