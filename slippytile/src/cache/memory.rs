//! Bounded in-memory cache of renderer resources with strict LRU eviction.
//!
//! Entries live in an arena of slots linked into a doubly linked recency list
//! by index, with a hash index from [`TileId`] to slot. Lookups, promotion,
//! insertion and eviction are all O(1); freed slots are recycled through a
//! free list so the arena never grows beyond the peak entry count.
//!
//! The cache owns every handle it holds. Handles leave the cache only through
//! its [`HandleReleaser`], on replacement, eviction, [`ResourceCache::clear`]
//! or drop.
//!
//! This type is not synchronized. Callers sharing it between threads must
//! wrap it themselves.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use tracing::{debug, info};

use crate::coord::TileId;

/// Default budget: 128 MiB.
pub const DEFAULT_BUDGET_BYTES: usize = 128 * 1024 * 1024;

/// Releases resource handles the cache no longer holds.
///
/// For GPU textures this is where the texture gets deleted.
pub trait HandleReleaser<H> {
    fn release(&mut self, key: &TileId, handle: H);
}

/// Releaser that simply drops the handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct DropReleaser;

impl<H> HandleReleaser<H> for DropReleaser {
    fn release(&mut self, _key: &TileId, handle: H) {
        drop(handle);
    }
}

impl<H, F> HandleReleaser<H> for F
where
    F: FnMut(&TileId, H),
{
    fn release(&mut self, key: &TileId, handle: H) {
        self(key, handle)
    }
}

/// Point-in-time statistics for a [`ResourceCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCacheStats {
    pub entries: usize,
    pub used_bytes: usize,
    pub budget_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl ResourceCacheStats {
    /// Fraction of lookups that hit, or 0.0 with no lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for ResourceCacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {} / {} bytes, {} hits, {} misses ({:.1}% hit rate), {} evictions",
            self.entries,
            self.used_bytes,
            self.budget_bytes,
            self.hits,
            self.misses,
            self.hit_rate() * 100.0,
            self.evictions
        )
    }
}

struct Node<H> {
    key: TileId,
    handle: H,
    size_bytes: usize,
    last_used: Instant,
    /// Towards the most recently used end.
    prev: Option<usize>,
    /// Towards the least recently used end.
    next: Option<usize>,
}

/// Byte-budgeted LRU cache of resource handles keyed by tile.
pub struct ResourceCache<H, R: HandleReleaser<H> = DropReleaser> {
    index: HashMap<TileId, usize>,
    slots: Vec<Option<Node<H>>>,
    free: Vec<usize>,
    /// Most recently used.
    head: Option<usize>,
    /// Least recently used.
    tail: Option<usize>,
    budget_bytes: usize,
    used_bytes: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
    releaser: R,
}

impl<H> ResourceCache<H, DropReleaser> {
    /// Creates a cache whose evicted handles are simply dropped.
    pub fn new(budget_bytes: usize) -> Self {
        Self::with_releaser(budget_bytes, DropReleaser)
    }
}

impl<H, R: HandleReleaser<H>> ResourceCache<H, R> {
    /// Creates a cache that hands evicted handles to `releaser`.
    pub fn with_releaser(budget_bytes: usize, releaser: R) -> Self {
        info!(budget_mb = budget_bytes / (1024 * 1024), "Resource cache initialized");
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            budget_bytes,
            used_bytes: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
            releaser,
        }
    }

    /// Looks up a handle, promoting the entry to most recently used.
    pub fn get(&mut self, key: &TileId) -> Option<&H> {
        let Some(&idx) = self.index.get(key) else {
            self.misses += 1;
            return None;
        };

        self.hits += 1;
        self.detach(idx);
        self.push_front(idx);

        let node = self.node_mut(idx);
        node.last_used = Instant::now();
        Some(&node.handle)
    }

    /// Inserts a handle, evicting least recently used entries to make room.
    ///
    /// An existing entry for `key` is released first. An entry larger than the
    /// whole budget is still accepted once everything else has been evicted.
    pub fn put(&mut self, key: TileId, handle: H, size_bytes: usize) {
        if let Some(idx) = self.index.remove(&key) {
            let old = self.take(idx);
            self.used_bytes -= old.size_bytes;
            self.releaser.release(&old.key, old.handle);
        }

        self.evict_to(self.budget_bytes.saturating_sub(size_bytes));

        let node = Node {
            key,
            handle,
            size_bytes,
            last_used: Instant::now(),
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.push_front(idx);
        self.index.insert(key, idx);
        self.used_bytes += size_bytes;

        debug!(
            tile = %key,
            size_kb = size_bytes / 1024,
            used_mb = self.used_bytes / (1024 * 1024),
            budget_mb = self.budget_bytes / (1024 * 1024),
            "Resource cache put"
        );
    }

    /// Membership test that leaves recency untouched.
    pub fn contains(&self, key: &TileId) -> bool {
        self.index.contains_key(key)
    }

    /// Looks up a handle without promoting it or touching the counters.
    pub fn peek(&self, key: &TileId) -> Option<&H> {
        self.index.get(key).map(|&idx| &self.node(idx).handle)
    }

    /// Evicts least recently used entries until usage is within the budget.
    pub fn evict_if_needed(&mut self) {
        self.evict_to(self.budget_bytes);
    }

    /// Evicts least recently used entries until usage is at most `target_bytes`.
    pub fn evict_to(&mut self, target_bytes: usize) {
        while self.used_bytes > target_bytes && self.evict_one() {}
    }

    /// Releases every handle and resets usage to zero.
    ///
    /// Hit/miss counters are kept; see [`ResourceCache::reset_stats`].
    pub fn clear(&mut self) {
        let entries = self.index.len();
        let freed = self.used_bytes;

        for node in self.slots.drain(..).flatten() {
            self.releaser.release(&node.key, node.handle);
        }
        self.index.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.used_bytes = 0;

        if entries > 0 {
            info!(entries, freed_mb = freed / (1024 * 1024), "Resource cache cleared");
        }
    }

    #[cfg(test)]
    fn last_used(&self, key: &TileId) -> Option<Instant> {
        self.index.get(key).map(|&idx| self.node(idx).last_used)
    }

    /// Keys ordered from most to least recently used.
    #[cfg(test)]
    fn keys_by_recency(&self) -> Vec<TileId> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = self.node(idx);
            keys.push(node.key);
            cursor = node.next;
        }
        keys
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    pub fn hit_count(&self) -> u64 {
        self.hits
    }

    pub fn miss_count(&self) -> u64 {
        self.misses
    }

    /// Zeroes the hit, miss and eviction counters.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }

    /// Snapshot of the current statistics.
    pub fn stats(&self) -> ResourceCacheStats {
        ResourceCacheStats {
            entries: self.len(),
            used_bytes: self.used_bytes,
            budget_bytes: self.budget_bytes,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }

    fn evict_one(&mut self) -> bool {
        let Some(idx) = self.tail else {
            return false;
        };
        let node = self.take(idx);
        self.index.remove(&node.key);
        self.used_bytes -= node.size_bytes;
        self.evictions += 1;

        debug!(
            tile = %node.key,
            size_kb = node.size_bytes / 1024,
            idle_ms = node.last_used.elapsed().as_millis() as u64,
            "Resource cache evict"
        );
        self.releaser.release(&node.key, node.handle);
        true
    }

    /// Unlinks a slot and returns its node, recycling the slot.
    fn take(&mut self, idx: usize) -> Node<H> {
        self.detach(idx);
        self.free.push(idx);
        // Linked indices always refer to occupied slots
        self.slots[idx]
            .take()
            .unwrap_or_else(|| unreachable!("slot {} is not occupied", idx))
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.node(idx);
            (node.prev, node.next)
        };

        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }

        let node = self.node_mut(idx);
        node.prev = None;
        node.next = None;
    }

    fn push_front(&mut self, idx: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(idx);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => self.node_mut(h).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn node(&self, idx: usize) -> &Node<H> {
        self.slots[idx]
            .as_ref()
            .unwrap_or_else(|| unreachable!("slot {} is not occupied", idx))
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<H> {
        self.slots[idx]
            .as_mut()
            .unwrap_or_else(|| unreachable!("slot {} is not occupied", idx))
    }
}

impl<H, R: HandleReleaser<H>> Drop for ResourceCache<H, R> {
    fn drop(&mut self) {
        self.clear();
    }
}
