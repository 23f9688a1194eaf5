//! Tile image decoding.
//!
//! Decoding is CPU-bound and blocking; callers run it on the blocking pool,
//! never on the UI-affine thread.

use std::fmt;
use std::io::Cursor;

use image::{DynamicImage, ImageReader, RgbaImage};

use crate::error::AssetError;
use crate::geometry::Size;

// =============================================================================
// Decoded Tile
// =============================================================================

/// A tile decoded into memory.
pub struct DecodedTile {
    image: DynamicImage,
}

impl DecodedTile {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    /// A transparent tile of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self::new(DynamicImage::ImageRgba8(RgbaImage::new(width, height)))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

impl fmt::Debug for DecodedTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedTile")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("color", &self.image.color())
            .finish()
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// Turns asset bytes into a [`DecodedTile`].
pub trait TileDecoder: Send + Sync + 'static {
    /// Decode `bytes`, read from `path`.
    ///
    /// `path` is only used for error reporting.
    fn decode(&self, path: &str, bytes: &[u8]) -> Result<DecodedTile, AssetError>;
}

/// Decoder backed by the `image` crate.
///
/// The format is guessed from the byte signature, so tile sets may mix PNG
/// and JPEG files regardless of their extension.
#[derive(Debug, Clone, Default)]
pub struct ImageTileDecoder {}

impl ImageTileDecoder {
    pub fn new() -> Self {
        Self {}
    }
}

impl TileDecoder for ImageTileDecoder {
    fn decode(&self, path: &str, bytes: &[u8]) -> Result<DecodedTile, AssetError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| decode_error(path, e))?;

        if reader.format().is_none() {
            return Err(AssetError::Decode {
                path: path.to_string(),
                message: "unrecognized image format".to_string(),
            });
        }

        let image = reader.decode().map_err(|e| decode_error(path, e))?;
        Ok(DecodedTile::new(image))
    }
}

fn decode_error(path: &str, err: impl fmt::Display) -> AssetError {
    AssetError::Decode {
        path: path.to_string(),
        message: err.to_string(),
    }
}
