//! Viewer engine: the UI-affine side of the tile pipeline.
//!
//! # Architecture
//!
//! ```text
//!   host events (layout, scroll, touch, tap)
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────────┐
//! │                 TiledViewer                 │
//! │  ┌──────────┐ ┌──────────┐ ┌─────────────┐  │
//! │  │Debouncer │ │  Pinch   │ │ MarkerLayer │  │
//! │  │fill/clean│ │ Tracker  │ │             │  │
//! │  └────┬─────┘ └────┬─────┘ └──────┬──────┘  │
//! │       │ event queue│ zoom step    │ icons   │
//! │       ▼            ▼              ▼         │
//! │  ┌────────────────────────────────────────┐ │
//! │  │   fill pass → TileLoader → publish     │ │
//! │  └───────────────────┬────────────────────┘ │
//! └──────────────────────┼──────────────────────┘
//!                        │ attach / detach
//!                        ▼
//!             ┌─────────────────────┐
//!             │   DisplaySurface    │
//!             └─────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`TiledViewer`]: engine tying planner, loader, cache and zoom state together
//! - [`DisplaySurface`]: the host's layout layer; [`HeadlessSurface`] in memory
//! - [`Debouncer`]: cancel-then-schedule timer for scroll fills and cleanup
//! - [`PinchTracker`]: two-pointer pinch detection
//! - [`MarkerLayer`]: point-of-interest icons and tap hit-testing

mod debounce;
mod engine;
mod gesture;
mod marker;
mod surface;

pub use debounce::{schedule, Debouncer, ScheduledTask};
pub use engine::{
    TiledViewer, ViewerObserver, ViewerSettings, ViewerStats, DEFAULT_CLEANUP_DELAY,
    DEFAULT_FILL_DELAY,
};
pub use gesture::{
    GestureOutcome, PinchTracker, TouchAction, TouchEvent, TouchPoint, DEFAULT_ZOOM_JUMP,
};
pub use marker::{Marker, MarkerLayer, DEFAULT_MARKER_ICON_SIZE};
pub use surface::{DisplaySurface, HeadlessNode, HeadlessSurface, NodeContent, NodeId};
