//! Index of tiles currently attached to the display surface.
//!
//! The cache is a lookup index, not an owner. The display surface owns each
//! decoded tile through its node; the cache keeps a [`Weak`] reference next to
//! the node id and the tile's pixel bounds. A tile the surface has dropped is
//! therefore "resident but stale": its weak reference no longer upgrades, and
//! the next lookup treats it exactly like an absent key.
//!
//! # Bounded size
//!
//! Entries are kept in LRU order with a fixed maximum entry count. When an
//! insertion pushes out the least recently used entry, that entry is returned
//! to the caller so the matching node can be detached from the surface.
//!
//! # Thread Safety
//!
//! All operations take an internal async lock, so the background loader and
//! the UI-affine thread can share one cache through `Arc` without lost
//! updates.

use std::num::NonZeroUsize;
use std::sync::{Arc, Weak};

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::debug;

use crate::asset::DecodedTile;
use crate::geometry::PixelRect;
use crate::viewer::NodeId;

use super::TileCoord;

/// Default maximum number of cached tiles.
pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 1024;

// =============================================================================
// Tile Handle
// =============================================================================

/// Non-owning handle to a tile attached to the display surface.
#[derive(Debug, Clone)]
pub struct TileHandle {
    node: NodeId,
    bounds: PixelRect,
    tile: Weak<DecodedTile>,
}

impl TileHandle {
    /// Create a handle for a tile attached as `node` at `bounds`.
    pub fn new(node: NodeId, bounds: PixelRect, tile: &Arc<DecodedTile>) -> Self {
        Self {
            node,
            bounds,
            tile: Arc::downgrade(tile),
        }
    }

    /// Surface node displaying this tile.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Pixel bounds of the tile in content space.
    pub fn bounds(&self) -> PixelRect {
        self.bounds
    }

    /// The decoded tile, if its owner still holds it.
    pub fn upgrade(&self) -> Option<Arc<DecodedTile>> {
        self.tile.upgrade()
    }

    /// Returns `true` while the decoded tile has not been reclaimed.
    pub fn is_live(&self) -> bool {
        self.tile.strong_count() > 0
    }
}

// =============================================================================
// Tile Cache
// =============================================================================

/// Concurrent LRU index from [`TileCoord`] to [`TileHandle`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tile_viewer::asset::DecodedTile;
/// use tile_viewer::geometry::PixelRect;
/// use tile_viewer::tile::{TileCache, TileCoord, TileHandle};
/// use tile_viewer::viewer::NodeId;
///
/// #[tokio::main]
/// async fn main() {
///     let cache = TileCache::new();
///     let tile = Arc::new(DecodedTile::blank(100, 100));
///     let coord = TileCoord::new(1, 2);
///
///     let handle = TileHandle::new(NodeId::new(7), PixelRect::new(100, 200, 100, 100), &tile);
///     cache.put(coord, handle).await;
///     assert!(cache.get(coord).await.is_some());
///
///     // Once the owner drops the tile, the entry reads as a miss
///     drop(tile);
///     assert!(cache.get(coord).await.is_none());
/// }
/// ```
pub struct TileCache {
    entries: RwLock<LruCache<TileCoord, TileHandle>>,
    capacity: NonZeroUsize,
}

impl TileCache {
    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_TILE_CACHE_CAPACITY)
    }

    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            capacity,
        }
    }

    /// Look up a live tile.
    ///
    /// Returns `None` both when the key is absent and when the handle has been
    /// reclaimed; a reclaimed entry is removed on the way out. A hit marks the
    /// entry as recently used.
    pub async fn get(&self, coord: TileCoord) -> Option<TileHandle> {
        let mut entries = self.entries.write().await;
        match entries.get(&coord) {
            Some(handle) if handle.is_live() => Some(handle.clone()),
            Some(_) => {
                debug!(tile = %coord, "dropping reclaimed tile from cache");
                entries.pop(&coord);
                None
            }
            None => None,
        }
    }

    /// Returns `true` if a live tile is cached, without touching LRU order.
    pub async fn contains(&self, coord: TileCoord) -> bool {
        let entries = self.entries.read().await;
        entries.peek(&coord).is_some_and(TileHandle::is_live)
    }

    /// Insert or replace a tile.
    ///
    /// Returns the entry displaced by the insertion: the previous handle for
    /// `coord`, or the least recently used entry if the cache was full. The
    /// caller owns detaching the displaced node from the surface.
    pub async fn put(&self, coord: TileCoord, handle: TileHandle) -> Option<(TileCoord, TileHandle)> {
        let mut entries = self.entries.write().await;
        entries.push(coord, handle)
    }

    /// Remove a single entry.
    pub async fn remove(&self, coord: TileCoord) -> Option<TileHandle> {
        let mut entries = self.entries.write().await;
        entries.pop(&coord)
    }

    /// Remove every live entry for which `predicate(coord, handle, bounds)`
    /// returns `true`, and return them.
    ///
    /// Entries whose tile has already been reclaimed are removed silently and
    /// are not passed to the predicate.
    pub async fn evict_where<F>(&self, mut predicate: F) -> Vec<(TileCoord, TileHandle)>
    where
        F: FnMut(&TileCoord, &TileHandle, &PixelRect) -> bool,
    {
        let mut entries = self.entries.write().await;

        let mut doomed = Vec::new();
        let mut reclaimed = Vec::new();
        for (coord, handle) in entries.iter() {
            if !handle.is_live() {
                reclaimed.push(*coord);
            } else if predicate(coord, handle, &handle.bounds) {
                doomed.push(*coord);
            }
        }

        for coord in &reclaimed {
            entries.pop(coord);
        }
        if !reclaimed.is_empty() {
            debug!(count = reclaimed.len(), "dropped reclaimed tiles during eviction");
        }

        doomed
            .into_iter()
            .filter_map(|coord| entries.pop(&coord).map(|handle| (coord, handle)))
            .collect()
    }

    /// Remove all entries, returning them.
    pub async fn clear(&self) -> Vec<(TileCoord, TileHandle)> {
        let mut entries = self.entries.write().await;
        let mut drained = Vec::with_capacity(entries.len());
        while let Some(entry) = entries.pop_lru() {
            drained.push(entry);
        }
        drained
    }

    /// Number of entries, including any not yet found to be reclaimed.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
