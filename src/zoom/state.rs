//! Zoom level state machine.
//!
//! Holds the current level and the configuration set bound to each level, and
//! decides whether a requested transition happens. The display-side steps of a
//! transition (clearing the cache, rebuilding the container, scrolling) are
//! carried out by the viewer using the returned [`ZoomTransition`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::geometry::{Point, Size};

use crate::geometry::saturate_i32;
use super::{ZoomConfigurationSet, ZoomLevel};

/// An accepted zoom level change.
#[derive(Debug, Clone)]
pub struct ZoomTransition {
    pub from: ZoomLevel,
    pub to: ZoomLevel,
    /// Configuration of the new level
    pub configuration: Arc<ZoomConfigurationSet>,
}

/// Current zoom level plus the configuration sets bound to each level.
///
/// [`ZoomLevel::Default`] always has a configuration; it is required at
/// construction.
#[derive(Debug, Clone)]
pub struct ZoomStateMachine {
    current: ZoomLevel,
    default: Arc<ZoomConfigurationSet>,
    configurations: HashMap<ZoomLevel, Arc<ZoomConfigurationSet>>,
}

impl ZoomStateMachine {
    /// Create a state machine at [`ZoomLevel::Default`].
    pub fn new(default: ZoomConfigurationSet) -> Self {
        let default = Arc::new(default);
        let mut configurations = HashMap::new();
        configurations.insert(ZoomLevel::Default, Arc::clone(&default));
        Self {
            current: ZoomLevel::Default,
            default,
            configurations,
        }
    }

    /// Bind a configuration set to a level, replacing any previous one.
    ///
    /// Takes effect at the next fill pass or transition. Rebinding the current
    /// level does not clear tiles already on screen.
    pub fn add_configuration_set(&mut self, level: ZoomLevel, set: ZoomConfigurationSet) {
        let set = Arc::new(set);
        if level == ZoomLevel::Default {
            self.default = Arc::clone(&set);
        }
        self.configurations.insert(level, set);
    }

    pub fn current(&self) -> ZoomLevel {
        self.current
    }

    /// Configuration of the current level.
    pub fn current_configuration(&self) -> Arc<ZoomConfigurationSet> {
        self.configuration(self.current)
            .unwrap_or_else(|| Arc::clone(&self.default))
    }

    pub fn configuration(&self, level: ZoomLevel) -> Option<Arc<ZoomConfigurationSet>> {
        self.configurations.get(&level).cloned()
    }

    pub fn has_configuration(&self, level: ZoomLevel) -> bool {
        self.configurations.contains_key(&level)
    }

    /// Levels with a bound configuration, lowest first.
    pub fn levels(&self) -> Vec<ZoomLevel> {
        let mut levels: Vec<_> = self.configurations.keys().copied().collect();
        levels.sort();
        levels
    }

    pub fn can_zoom_further_up(&self) -> bool {
        let next = self.current.up();
        next != self.current && self.has_configuration(next)
    }

    pub fn can_zoom_further_down(&self) -> bool {
        let next = self.current.down();
        next != self.current && self.has_configuration(next)
    }

    /// Move to `target` if it differs from the current level and has a
    /// configuration. Returns `None` (no-op) otherwise.
    pub fn transition(&mut self, target: ZoomLevel) -> Option<ZoomTransition> {
        if target == self.current {
            return None;
        }
        let configuration = self.configuration(target)?;

        let from = self.current;
        self.current = target;

        Some(ZoomTransition {
            from,
            to: target,
            configuration,
        })
    }
}

/// Map a scroll offset to the same proportional position in new content.
///
/// Computes `(x / w * new_w, y / h * new_h)` exactly, truncated towards zero.
/// An axis whose old extent is zero maps to 0.
pub fn proportional_scroll(scroll: Point, old: Size, new: Size) -> Point {
    fn axis(offset: i32, old: u32, new: u32) -> i32 {
        if old == 0 {
            return 0;
        }
        saturate_i32(i64::from(offset) * i64::from(new) / i64::from(old))
    }

    Point::new(
        axis(scroll.x, old.width, new.width),
        axis(scroll.y, old.height, new.height),
    )
}
