//! Point-of-interest markers drawn over the tiles.

use serde::Serialize;

use crate::geometry::{saturate_i32, PixelRect, Point, Size};

use super::surface::{DisplaySurface, NodeContent, NodeId};

/// Default marker icon size in pixels.
pub const DEFAULT_MARKER_ICON_SIZE: Size = Size::new(32, 32);

/// A point of interest in content pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub x: i32,
    pub y: i32,
    pub description: String,
}

impl Marker {
    pub fn new(x: i32, y: i32, description: impl Into<String>) -> Self {
        Self {
            x,
            y,
            description: description.into(),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The viewer's markers and the surface nodes currently showing them.
///
/// Markers live as long as the viewer. Their icons are re-attached after every
/// fill pass so they stay above the tiles.
#[derive(Debug)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    icon_size: Size,
    rendered: Vec<(usize, NodeId, PixelRect)>,
}

impl MarkerLayer {
    pub fn new(icon_size: Size) -> Self {
        Self {
            markers: Vec::new(),
            icon_size,
            rendered: Vec::new(),
        }
    }

    /// Add a marker. It is drawn on the next render.
    pub fn add(&mut self, marker: Marker) -> usize {
        self.markers.push(marker);
        self.markers.len() - 1
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    /// Icon rectangle, centred on the marker.
    pub fn icon_bounds(&self, marker: &Marker) -> PixelRect {
        let half_width = i64::from(self.icon_size.width / 2);
        let half_height = i64::from(self.icon_size.height / 2);
        PixelRect::new(
            saturate_i32(i64::from(marker.x) - half_width),
            saturate_i32(i64::from(marker.y) - half_height),
            self.icon_size.width,
            self.icon_size.height,
        )
    }

    /// Detach current icons and attach one per marker.
    pub fn render<S: DisplaySurface + ?Sized>(&mut self, surface: &mut S) {
        self.hide(surface);

        for (index, marker) in self.markers.iter().enumerate() {
            let bounds = self.icon_bounds(marker);
            let node = surface.attach(bounds, NodeContent::Marker { index });
            self.rendered.push((index, node, bounds));
        }
    }

    /// Detach every icon.
    pub fn hide<S: DisplaySurface + ?Sized>(&mut self, surface: &mut S) {
        for (_, node, _) in self.rendered.drain(..) {
            surface.detach(node);
        }
    }

    /// Drop node references after the surface discarded its children.
    pub fn forget_nodes(&mut self) {
        self.rendered.clear();
    }

    /// Marker whose icon contains `point` (content space), topmost first.
    pub fn hit_test(&self, point: Point) -> Option<&Marker> {
        self.rendered
            .iter()
            .rev()
            .find(|(_, _, bounds)| bounds.contains(point))
            .and_then(|(index, _, _)| self.markers.get(*index))
    }
}

impl Default for MarkerLayer {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_ICON_SIZE)
    }
}
