//! Visible-region tile planning.
//!
//! Given the viewport, the scroll offset and a level's configuration, the
//! planner lists every tile that must be present on the display surface.
//!
//! # Prefetch margin
//!
//! The planned region extends one tile width past the right edge and one tile
//! height past the bottom edge of the viewport, so a tile that is about to
//! scroll into view is already loaded when it appears.
//!
//! # Grid
//!
//! Indices come from floor division of pixel coordinates by the tile size and
//! are clamped to the level's tile grid: pixels left of or above the image, or
//! past its right or bottom edge, never produce a tile.

use crate::geometry::{PixelRect, Point};
use crate::zoom::ZoomConfigurationSet;

use super::TileCoord;

/// Plan the tiles needed for a viewport.
///
/// `viewport` is the visible rectangle of the content container before
/// scrolling; `scroll` is the current scroll offset. The result is ordered row
/// by row, left to right, and contains no duplicates.
///
/// Pure and thread-safe; identical inputs always yield identical output.
///
/// # Example
///
/// ```
/// use tile_viewer::geometry::{PixelRect, Point};
/// use tile_viewer::tile::plan;
/// use tile_viewer::zoom::ZoomConfigurationSet;
///
/// let config = ZoomConfigurationSet::new("t_%col%_%row%.png", 100, 100, 800, 600).unwrap();
/// let tiles = plan(PixelRect::new(0, 0, 400, 300), Point::new(0, 0), &config);
///
/// // 4x3 visible tiles plus one margin column and row
/// assert_eq!(tiles.len(), 20);
/// ```
pub fn plan(viewport: PixelRect, scroll: Point, config: &ZoomConfigurationSet) -> Vec<TileCoord> {
    let tile_width = i64::from(config.tile_width());
    let tile_height = i64::from(config.tile_height());
    let (grid_cols, grid_rows) = config.grid_size();

    let left = i64::from(viewport.x) + i64::from(scroll.x);
    let top = i64::from(viewport.y) + i64::from(scroll.y);
    let right = viewport.right() + i64::from(scroll.x) + tile_width;
    let bottom = viewport.bottom() + i64::from(scroll.y) + tile_height;

    let Some(cols) = index_span(left, right, tile_width, grid_cols) else {
        return Vec::new();
    };
    let Some(rows) = index_span(top, bottom, tile_height, grid_rows) else {
        return Vec::new();
    };

    let mut tiles = Vec::with_capacity(cols.len() * rows.len());
    for row in rows {
        for col in cols.clone() {
            tiles.push(TileCoord::new(col, row));
        }
    }
    tiles
}

/// Tile indices touched by the half-open pixel span `[start, end)`, clamped to
/// `[0, grid)`.
fn index_span(start: i64, end: i64, tile: i64, grid: u32) -> Option<std::ops::Range<u32>> {
    if end <= start || grid == 0 {
        return None;
    }

    let first = start.div_euclid(tile).max(0);
    let last = (end - 1).div_euclid(tile).min(i64::from(grid) - 1);
    if last < first {
        return None;
    }

    // Both bounds lie in [0, grid) here
    Some(first as u32..last as u32 + 1)
}
