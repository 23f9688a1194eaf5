//! Zoom levels and their tile set configurations.
//!
//! - [`ZoomLevel`]: ordered resolution tiers with saturating `up()`/`down()`
//! - [`ZoomConfigurationSet`]: validated tile/image dimensions and path template
//! - [`ZoomStateMachine`]: current level, level→configuration bindings, transitions

mod configuration;
mod level;
mod state;

pub use configuration::{ZoomConfigurationSet, COL_PLACEHOLDER, ROW_PLACEHOLDER};
pub use level::ZoomLevel;
pub use state::{proportional_scroll, ZoomStateMachine, ZoomTransition};
