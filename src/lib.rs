//! # Tile Viewer
//!
//! A scrollable, zoomable viewer engine for very large pre-tiled images.
//!
//! Images are stored as a grid of independently decodable tiles per zoom
//! level. The engine decodes only the tiles that intersect the visible
//! viewport (plus a one-tile prefetch margin), attaches them to a display
//! surface, and drops them again once they scroll out of view.
//!
//! ## Features
//!
//! - **Lazy loading**: Only visible tiles are read and decoded, off the UI task
//! - **Discrete zoom levels**: Each level has its own tile set; switching keeps
//!   the proportional scroll position
//! - **Debounced filling**: Bursts of scroll events trigger a single fill pass
//! - **Pinch to zoom**: Two-pointer gestures step between zoom levels
//! - **Markers**: Point-of-interest icons with tap hit-testing
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`geometry`] - Pixel-space points, sizes and rectangles
//! - [`zoom`] - Zoom levels, per-level configuration sets and transitions
//! - [`tile`] - Tile planning, the shared tile cache and the background loader
//! - [`asset`] - Asset sources, tile decoding and tile set manifests
//! - [`viewer`] - The UI-affine engine, display surface, debouncing and gestures
//! - [`config`] - CLI configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use tile_viewer::{FsAssetSource, HeadlessSurface, Size, TiledViewer, ZoomConfigurationSet, ZoomLevel};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let default = ZoomConfigurationSet::new("tiger800/crop_%col%_%row%.png", 100, 100, 800, 600)?;
//!     let level1 = ZoomConfigurationSet::new("tiger1600/crop_%col%_%row%.png", 100, 100, 1600, 1200)?;
//!
//!     let surface = HeadlessSurface::new(Size::new(400, 300));
//!     let mut viewer = TiledViewer::new(surface, FsAssetSource::new("assets"), default);
//!     viewer.add_configuration_set(ZoomLevel::Level1, level1);
//!     viewer.add_marker(420, 260, "Left eye");
//!
//!     // Initial layout
//!     viewer.on_size_changed();
//!     viewer.drain_loads().await;
//!
//!     viewer.zoom_up().await;
//!     viewer.drain_loads().await;
//!     Ok(())
//! }
//! ```

pub mod asset;
pub mod config;
pub mod error;
pub mod geometry;
pub mod tile;
pub mod viewer;
pub mod zoom;

// Re-export commonly used types
pub use asset::{
    AssetSource, DecodedTile, FsAssetSource, ImageTileDecoder, LevelEntry, MemoryAssetSource,
    TileDecoder, TileSetManifest, MANIFEST_FILE_NAME,
};
pub use config::{CheckConfig, Cli, Command, PlanConfig, ViewConfig};
pub use error::{AssetError, ConfigError, ManifestError};
pub use geometry::{PixelRect, Point, Size};
pub use tile::{
    plan, LoadEvent, TileCache, TileCoord, TileHandle, TileLoader, DEFAULT_MAX_CONCURRENT_DECODES,
    DEFAULT_TILE_CACHE_CAPACITY,
};
pub use viewer::{
    schedule, Debouncer, DisplaySurface, GestureOutcome, HeadlessSurface, Marker, MarkerLayer,
    NodeContent, NodeId, PinchTracker, ScheduledTask, TiledViewer, TouchAction, TouchEvent,
    TouchPoint, ViewerObserver, ViewerSettings, ViewerStats,
};
pub use zoom::{proportional_scroll, ZoomConfigurationSet, ZoomLevel, ZoomStateMachine, ZoomTransition};
