//! Tile engine core.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Viewer (UI-affine thread)        │
//! └──────┬─────────────┬──────────────▲─────┘
//!        │ viewport    │ coords        │ LoadEvent channel
//!        ▼             ▼               │
//! ┌────────────┐  ┌─────────────────────┴───┐
//! │  planner   │  │       TileLoader        │
//! │  (pure)    │  │  (background producer)  │
//! └────────────┘  └────────────┬────────────┘
//!                              │ residency check
//!                              ▼
//!                 ┌─────────────────────────┐
//!                 │        TileCache        │
//!                 │ (coord → weak handle)   │
//!                 └─────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TileCoord`]: column/row in a level's tile grid
//! - [`plan`]: tiles required for a viewport, with a one-tile prefetch margin
//! - [`TileCache`]: concurrent LRU index of tiles on the display surface
//! - [`TileLoader`]: reads and decodes missing tiles off the UI thread

mod cache;
mod coord;
mod loader;
mod planner;

pub use cache::{TileCache, TileHandle, DEFAULT_TILE_CACHE_CAPACITY};
pub use coord::TileCoord;
pub use loader::{LoadEvent, TileLoader, DEFAULT_MAX_CONCURRENT_DECODES};
pub use planner::plan;
