//! Asset layer: reading and decoding tile images.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               TileLoader                │
//! └──────────┬──────────────────┬───────────┘
//!            │ bytes            │ pixels
//!            ▼                  ▼
//! ┌────────────────────┐  ┌──────────────────┐
//! │ AssetSource Trait  │  │ TileDecoder Trait│
//! │  FsAssetSource     │  │ ImageTileDecoder │
//! │  MemoryAssetSource │  │                  │
//! └────────────────────┘  └──────────────────┘
//! ```
//!
//! [`TileSetManifest`] describes a tile set's zoom levels on disk.

mod decoder;
mod manifest;
mod source;

pub use decoder::{DecodedTile, ImageTileDecoder, TileDecoder};
pub use manifest::{LevelEntry, TileSetManifest, MANIFEST_FILE_NAME};
pub use source::{AssetSource, FsAssetSource, MemoryAssetSource};
