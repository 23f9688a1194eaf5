//! Per-level tile set configuration.

use crate::error::ConfigError;
use crate::geometry::{saturate_i32, PixelRect, Size};
use crate::tile::TileCoord;

/// Placeholder in a tile path template. Receives the tile's **row** index.
pub const COL_PLACEHOLDER: &str = "%col%";

/// Placeholder in a tile path template. Receives the tile's **column** index.
pub const ROW_PLACEHOLDER: &str = "%row%";

/// Immutable parameters of one zoom level's tile set.
///
/// Construction validates every field, so a `ZoomConfigurationSet` that exists
/// always has strictly positive dimensions and a template containing both
/// placeholders.
///
/// # Path naming
///
/// Existing tile sets name their files with the placeholders crossed over:
/// `%col%` is replaced with the tile's row index and `%row%` with its column
/// index. [`ZoomConfigurationSet::tile_path`] keeps that convention.
///
/// # Example
///
/// ```
/// use tile_viewer::tile::TileCoord;
/// use tile_viewer::zoom::ZoomConfigurationSet;
///
/// let config = ZoomConfigurationSet::new("t_%col%_%row%.png", 100, 100, 800, 600).unwrap();
/// assert_eq!(config.tile_path(TileCoord::new(3, 1)), "t_1_3.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoomConfigurationSet {
    template: String,
    tile_width: u32,
    tile_height: u32,
    image_width: u32,
    image_height: u32,
}

impl ZoomConfigurationSet {
    /// Validate and create a configuration set.
    ///
    /// # Errors
    ///
    /// Returns an error if any dimension is zero, the template is empty, or
    /// the template lacks `%col%` or `%row%`.
    pub fn new(
        template: impl Into<String>,
        tile_width: u32,
        tile_height: u32,
        image_width: u32,
        image_height: u32,
    ) -> Result<Self, ConfigError> {
        let template = template.into();

        if template.trim().is_empty() {
            return Err(ConfigError::MissingTemplate);
        }
        for placeholder in [COL_PLACEHOLDER, ROW_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(ConfigError::MissingPlaceholder {
                    template,
                    placeholder,
                });
            }
        }

        for (field, value) in [
            ("tile_width", tile_width),
            ("tile_height", tile_height),
            ("image_width", image_width),
            ("image_height", image_height),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidDimension { field, value });
            }
        }

        Ok(Self {
            template,
            tile_width,
            tile_height,
            image_width,
            image_height,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn tile_size(&self) -> Size {
        Size::new(self.tile_width, self.tile_height)
    }

    /// Full image dimensions at this level.
    pub fn image_size(&self) -> Size {
        Size::new(self.image_width, self.image_height)
    }

    /// Number of tile columns and rows covering the image.
    pub fn grid_size(&self) -> (u32, u32) {
        (
            self.image_width.div_ceil(self.tile_width),
            self.image_height.div_ceil(self.tile_height),
        )
    }

    /// Resolve the asset path of a tile.
    pub fn tile_path(&self, coord: TileCoord) -> String {
        self.template
            .replace(COL_PLACEHOLDER, &coord.row.to_string())
            .replace(ROW_PLACEHOLDER, &coord.col.to_string())
    }

    /// Pixel offset of a tile's top-left corner in content space.
    pub fn tile_origin(&self, coord: TileCoord) -> (i64, i64) {
        (
            i64::from(coord.col) * i64::from(self.tile_width),
            i64::from(coord.row) * i64::from(self.tile_height),
        )
    }

    /// Nominal bounds of a tile, before its decoded size is known.
    pub fn tile_bounds(&self, coord: TileCoord) -> PixelRect {
        let (x, y) = self.tile_origin(coord);
        PixelRect::new(
            saturate_i32(x),
            saturate_i32(y),
            self.tile_width,
            self.tile_height,
        )
    }
}
