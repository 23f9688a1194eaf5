use std::fmt;

use serde::Serialize;

/// Column/row of a tile in a zoom level's tile grid.
///
/// Grid-indexed, not pixel-indexed: tile `(c, r)` covers pixels starting at
/// `(c * tile_width, r * tile_height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TileCoord {
    /// Tile column (0-indexed from left)
    pub col: u32,

    /// Tile row (0-indexed from top)
    pub row: u32,
}

impl TileCoord {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}
