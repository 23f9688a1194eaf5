//! Background tile loading.
//!
//! [`TileLoader::load_missing`] starts a producer task that reads and decodes
//! every requested tile not already resident in the cache, and returns the
//! receiving end of a channel of [`LoadEvent`]s. The batch is finished when
//! the channel closes.
//!
//! - Reading goes through the [`AssetSource`]; decoding runs on the blocking
//!   pool, never on the task that consumes the channel.
//! - Up to `max_concurrent` tiles are in flight at once. Events are sent in
//!   completion order, which need not match request order.
//! - A tile that fails to load is reported as [`LoadEvent::Failed`] and does
//!   not affect its siblings.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::asset::{AssetSource, DecodedTile, ImageTileDecoder, TileDecoder};
use crate::error::AssetError;
use crate::zoom::ZoomConfigurationSet;

use super::{TileCache, TileCoord};

/// Default number of tiles decoded concurrently per batch.
pub const DEFAULT_MAX_CONCURRENT_DECODES: usize = 4;

/// Channel buffer per batch.
const EVENT_BUFFER: usize = 32;

/// Outcome for one tile of a batch.
#[derive(Debug)]
pub enum LoadEvent {
    /// The tile was read and decoded
    Loaded {
        coord: TileCoord,
        tile: Arc<DecodedTile>,
    },

    /// The tile could not be read or decoded; it stays absent
    Failed { coord: TileCoord, error: AssetError },
}

impl LoadEvent {
    pub fn coord(&self) -> TileCoord {
        match self {
            LoadEvent::Loaded { coord, .. } | LoadEvent::Failed { coord, .. } => *coord,
        }
    }
}

/// Reads and decodes tiles off the consumer's thread.
///
/// # Type Parameters
///
/// * `A` - Where tile bytes come from
/// * `D` - How tile bytes become pixels
pub struct TileLoader<A: AssetSource, D: TileDecoder = ImageTileDecoder> {
    source: Arc<A>,
    decoder: Arc<D>,
    max_concurrent: usize,
}

impl<A: AssetSource> TileLoader<A> {
    /// Create a loader using the `image`-backed decoder.
    pub fn new(source: A) -> Self {
        Self::with_decoder(source, ImageTileDecoder::new())
    }
}

impl<A: AssetSource, D: TileDecoder> TileLoader<A, D> {
    pub fn with_decoder(source: A, decoder: D) -> Self {
        Self {
            source: Arc::new(source),
            decoder: Arc::new(decoder),
            max_concurrent: DEFAULT_MAX_CONCURRENT_DECODES,
        }
    }

    /// Set the number of tiles decoded concurrently (minimum 1).
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn source(&self) -> &Arc<A> {
        &self.source
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Load every tile in `coords` that is not live in `cache`.
    ///
    /// Must be called from within a Tokio runtime. The returned receiver
    /// yields one event per tile actually loaded; it closes when the batch is
    /// done. Dropping the receiver stops the batch after the tiles already in
    /// flight.
    pub fn load_missing(
        &self,
        coords: Vec<TileCoord>,
        config: Arc<ZoomConfigurationSet>,
        cache: Arc<TileCache>,
    ) -> mpsc::Receiver<LoadEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let source = Arc::clone(&self.source);
        let decoder = Arc::clone(&self.decoder);
        let max_concurrent = self.max_concurrent;

        tokio::spawn(async move {
            let mut in_flight = JoinSet::new();
            let mut pending = coords.into_iter();

            loop {
                while in_flight.len() < max_concurrent {
                    let Some(coord) = pending.next() else { break };
                    if cache.contains(coord).await {
                        continue;
                    }

                    let path = config.tile_path(coord);
                    let source = Arc::clone(&source);
                    let decoder = Arc::clone(&decoder);
                    in_flight.spawn(async move {
                        match load_tile(source.as_ref(), decoder, path).await {
                            Ok(tile) => LoadEvent::Loaded {
                                coord,
                                tile: Arc::new(tile),
                            },
                            Err(error) => LoadEvent::Failed { coord, error },
                        }
                    });
                }

                let Some(joined) = in_flight.join_next().await else {
                    break;
                };
                let event = match joined {
                    Ok(event) => event,
                    Err(e) => {
                        warn!("tile load task failed: {}", e);
                        continue;
                    }
                };

                match &event {
                    LoadEvent::Loaded { coord, tile } => {
                        debug!(tile = %coord, width = tile.width(), height = tile.height(), "tile decoded");
                    }
                    LoadEvent::Failed { coord, error } => {
                        warn!(tile = %coord, "skipping tile: {}", error);
                    }
                }

                if tx.send(event).await.is_err() {
                    debug!("tile consumer went away, abandoning batch");
                    in_flight.detach_all();
                    return;
                }
            }
        });

        rx
    }
}

/// Read one asset and decode it on the blocking pool.
async fn load_tile<A: AssetSource, D: TileDecoder>(
    source: &A,
    decoder: Arc<D>,
    path: String,
) -> Result<DecodedTile, AssetError> {
    let bytes = source.open_for_read(&path).await?;

    let task_path = path.clone();
    tokio::task::spawn_blocking(move || decoder.decode(&task_path, &bytes))
        .await
        .map_err(|e| AssetError::Decode {
            path,
            message: format!("decode task failed: {e}"),
        })?
}
