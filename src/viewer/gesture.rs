//! Pinch-to-zoom detection.
//!
//! While exactly two pointers are down, every touch event belongs to the
//! pinch. The distance between the pointers is compared with the last sampled
//! distance; a change larger than the zoom jump steps the zoom level and
//! resamples. After a pinch, the remaining finger's events are swallowed until
//! it lifts, so the end of a pinch never turns into a scroll jump.

/// Default separation change, in pixels, that steps one zoom level.
pub const DEFAULT_ZOOM_JUMP: f32 = 75.0;

/// Kind of touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    /// First pointer went down
    Down,
    /// An additional pointer went down
    PointerDown,
    Move,
    /// A pointer other than the last one went up
    PointerUp,
    /// The last pointer went up
    Up,
    Cancel,
}

/// Position of one pointer, in view pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A touch event with every pointer that is down when it happens.
///
/// For [`TouchAction::PointerUp`] and [`TouchAction::Up`] the lifting pointer
/// is still included.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub pointers: Vec<TouchPoint>,
}

impl TouchEvent {
    pub fn new(action: TouchAction, pointers: impl Into<Vec<TouchPoint>>) -> Self {
        Self {
            action,
            pointers: pointers.into(),
        }
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Distance between the first two pointers.
    pub fn separation(&self) -> Option<f32> {
        match self.pointers.as_slice() {
            [a, b, ..] => Some((a.x - b.x).hypot(a.y - b.y)),
            _ => None,
        }
    }
}

/// What the viewer should do with a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Not part of a pinch; hand it to normal scroll handling
    Forward,
    /// Part of a pinch, or swallowed after one
    Consumed,
    /// Pinch opened past the zoom jump
    ZoomIn,
    /// Pinch closed past the zoom jump
    ZoomOut,
}

/// Tracks two-pointer separation across touch events.
#[derive(Debug, Clone)]
pub struct PinchTracker {
    zoom_jump: f32,
    sampled_separation: f32,
    ignore_last_finger: bool,
}

impl PinchTracker {
    pub fn new(zoom_jump: f32) -> Self {
        Self {
            zoom_jump,
            sampled_separation: 0.0,
            ignore_last_finger: false,
        }
    }

    pub fn zoom_jump(&self) -> f32 {
        self.zoom_jump
    }

    pub fn on_touch(&mut self, event: &TouchEvent) -> GestureOutcome {
        if event.pointer_count() == 2 {
            let separation = event.separation().unwrap_or(self.sampled_separation);
            return match event.action {
                TouchAction::PointerDown => {
                    self.sampled_separation = separation;
                    GestureOutcome::Consumed
                }
                TouchAction::PointerUp => {
                    self.ignore_last_finger = true;
                    GestureOutcome::Consumed
                }
                TouchAction::Move if separation - self.sampled_separation > self.zoom_jump => {
                    self.sampled_separation = separation;
                    GestureOutcome::ZoomIn
                }
                TouchAction::Move if self.sampled_separation - separation > self.zoom_jump => {
                    self.sampled_separation = separation;
                    GestureOutcome::ZoomOut
                }
                _ => GestureOutcome::Consumed,
            };
        }

        if self.ignore_last_finger {
            if matches!(event.action, TouchAction::Up | TouchAction::Cancel) {
                self.ignore_last_finger = false;
            }
            return GestureOutcome::Consumed;
        }

        GestureOutcome::Forward
    }
}

impl Default for PinchTracker {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_JUMP)
    }
}
