//! Display surface: the host's view/layout layer as seen by the viewer.
//!
//! The viewer only needs a container it can add children to at pixel offsets,
//! plus the scroll offset and measured size of the view around it.
//! [`HeadlessSurface`] implements this in memory for the CLI and for tests.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::asset::DecodedTile;
use crate::geometry::{PixelRect, Point, Size};
use crate::tile::TileCoord;

/// Identifier of a child node on a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node displays.
///
/// A tile node owns its decoded tile; the tile cache only refers to it.
#[derive(Debug, Clone)]
pub enum NodeContent {
    Tile {
        coord: TileCoord,
        tile: Arc<DecodedTile>,
    },
    /// Icon for the marker at this index in the viewer's marker list
    Marker { index: usize },
}

/// The host's view/layout layer.
///
/// All methods are called on the UI-affine thread only.
pub trait DisplaySurface {
    /// Current scroll offset of the view.
    fn scroll_offset(&self) -> Point;

    /// Measured size of the view (the visible window onto the content).
    fn measured_size(&self) -> Size;

    /// Size of the content container.
    fn content_size(&self) -> Size;

    /// Drawing rectangle of the content container, before scrolling.
    fn viewport(&self) -> PixelRect {
        PixelRect::from_origin_size(Point::ORIGIN, self.measured_size())
    }

    /// Discard every child and resize the content container.
    fn reset_content(&mut self, size: Size);

    /// Add a child at `bounds` in content space.
    fn attach(&mut self, bounds: PixelRect, content: NodeContent) -> NodeId;

    /// Remove a child. Returns `false` if it was not attached.
    fn detach(&mut self, node: NodeId) -> bool;

    /// Returns `true` if `node` is currently attached.
    fn contains(&self, node: NodeId) -> bool;

    /// Scroll towards `target`, possibly animated.
    fn smooth_scroll_to(&mut self, target: Point);
}

// =============================================================================
// Headless Surface
// =============================================================================

/// A node attached to a [`HeadlessSurface`].
#[derive(Debug, Clone)]
pub struct HeadlessNode {
    pub bounds: PixelRect,
    pub content: NodeContent,
}

/// In-memory display surface.
///
/// Scrolling is applied immediately and clamped to the content bounds.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    nodes: BTreeMap<NodeId, HeadlessNode>,
    next_id: u64,
    scroll: Point,
    measured: Size,
    content: Size,
}

impl HeadlessSurface {
    /// Create a surface whose view measures `measured`.
    pub fn new(measured: Size) -> Self {
        Self {
            measured,
            ..Self::default()
        }
    }

    /// Set the view size, as on layout or rotation.
    pub fn set_measured_size(&mut self, measured: Size) {
        self.measured = measured;
        self.scroll = self.clamp_scroll(self.scroll);
    }

    /// Scroll immediately, clamped to the content.
    pub fn scroll_to(&mut self, target: Point) {
        self.scroll = self.clamp_scroll(target);
    }

    pub fn node(&self, node: NodeId) -> Option<&HeadlessNode> {
        self.nodes.get(&node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Attached tiles and their bounds, in attachment order.
    pub fn tiles(&self) -> Vec<(TileCoord, PixelRect)> {
        self.nodes
            .values()
            .filter_map(|node| match &node.content {
                NodeContent::Tile { coord, .. } => Some((*coord, node.bounds)),
                NodeContent::Marker { .. } => None,
            })
            .collect()
    }

    /// Attached marker icons and their bounds.
    pub fn markers(&self) -> Vec<(usize, PixelRect)> {
        self.nodes
            .values()
            .filter_map(|node| match node.content {
                NodeContent::Marker { index } => Some((index, node.bounds)),
                NodeContent::Tile { .. } => None,
            })
            .collect()
    }

    /// Node displaying `coord`, if any.
    pub fn tile_node(&self, coord: TileCoord) -> Option<NodeId> {
        self.nodes.iter().find_map(|(id, node)| match &node.content {
            NodeContent::Tile { coord: c, .. } if *c == coord => Some(*id),
            _ => None,
        })
    }

    fn clamp_scroll(&self, target: Point) -> Point {
        fn axis(value: i32, content: u32, view: u32) -> i32 {
            let max = i64::from(content.saturating_sub(view));
            i64::from(value).clamp(0, max) as i32
        }
        Point::new(
            axis(target.x, self.content.width, self.measured.width),
            axis(target.y, self.content.height, self.measured.height),
        )
    }
}

impl DisplaySurface for HeadlessSurface {
    fn scroll_offset(&self) -> Point {
        self.scroll
    }

    fn measured_size(&self) -> Size {
        self.measured
    }

    fn content_size(&self) -> Size {
        self.content
    }

    fn reset_content(&mut self, size: Size) {
        self.nodes.clear();
        self.content = size;
    }

    fn attach(&mut self, bounds: PixelRect, content: NodeContent) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, HeadlessNode { bounds, content });
        id
    }

    fn detach(&mut self, node: NodeId) -> bool {
        self.nodes.remove(&node).is_some()
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn smooth_scroll_to(&mut self, target: Point) {
        self.scroll_to(target);
    }
}
