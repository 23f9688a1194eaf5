//! Command-line configuration for the tile viewer.
//!
//! The binary has three subcommands:
//!
//! - `plan` - print the tiles (and their asset paths) a viewport needs
//! - `view` - run a headless viewer over a tile set and report what it attached
//! - `check` - verify that every tile of a tile set exists and decodes
//!
//! # Environment Variables
//!
//! Options shared by the subcommands can be set with the `TILE_VIEWER_` prefix:
//!
//! - `TILE_VIEWER_MANIFEST` - Path to the tile set manifest (required)
//! - `TILE_VIEWER_ROOT` - Directory tile paths are resolved against
//!   (default: the manifest's directory)
//! - `TILE_VIEWER_VIEWPORT_WIDTH` - Viewport width in pixels (default: 400)
//! - `TILE_VIEWER_VIEWPORT_HEIGHT` - Viewport height in pixels (default: 300)
//! - `TILE_VIEWER_CACHE_TILES` - Max tiles kept in the cache (default: 1024)
//! - `TILE_VIEWER_MAX_DECODES` - Tiles decoded concurrently (default: 4)

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::geometry::{Point, Size};
use crate::tile::{DEFAULT_MAX_CONCURRENT_DECODES, DEFAULT_TILE_CACHE_CAPACITY};
use crate::zoom::ZoomLevel;

// =============================================================================
// Default Values
// =============================================================================

/// Default viewport width.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 400;

/// Default viewport height.
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 300;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Tile Viewer - lazily loaded viewer engine for very large tiled images.
#[derive(Parser, Debug, Clone)]
#[command(name = "tile-viewer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn into_command(self) -> Command {
        self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the tiles needed to cover a viewport
    Plan(PlanConfig),

    /// Run a headless viewer and report the tiles it attached
    View(ViewConfig),

    /// Verify that every tile of a tile set exists and decodes
    Check(CheckConfig),
}

/// Where the tile set lives.
#[derive(Args, Debug, Clone)]
pub struct TileSetArgs {
    /// Path to the tile set manifest (JSON).
    #[arg(long, short, env = "TILE_VIEWER_MANIFEST")]
    pub manifest: PathBuf,

    /// Directory tile paths are resolved against.
    ///
    /// Defaults to the directory containing the manifest.
    #[arg(long, env = "TILE_VIEWER_ROOT")]
    pub root: Option<PathBuf>,
}

impl TileSetArgs {
    /// Directory the asset source reads from.
    pub fn asset_root(&self) -> PathBuf {
        match &self.root {
            Some(root) => root.clone(),
            None => self
                .manifest
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.manifest.as_os_str().is_empty() {
            return Err(
                "Manifest path is required. Set --manifest or TILE_VIEWER_MANIFEST".to_string(),
            );
        }
        Ok(())
    }
}

/// The visible window onto the image.
#[derive(Args, Debug, Clone)]
pub struct ViewportArgs {
    /// Viewport width in pixels.
    #[arg(long, default_value_t = DEFAULT_VIEWPORT_WIDTH, env = "TILE_VIEWER_VIEWPORT_WIDTH")]
    pub width: u32,

    /// Viewport height in pixels.
    #[arg(long, default_value_t = DEFAULT_VIEWPORT_HEIGHT, env = "TILE_VIEWER_VIEWPORT_HEIGHT")]
    pub height: u32,

    /// Horizontal scroll offset in pixels.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub scroll_x: i32,

    /// Vertical scroll offset in pixels.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub scroll_y: i32,
}

impl ViewportArgs {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn scroll(&self) -> Point {
        Point::new(self.scroll_x, self.scroll_y)
    }

    fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "Viewport must be at least 1x1 pixels, got {}x{}",
                self.width, self.height
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Plan Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct PlanConfig {
    #[command(flatten)]
    pub tileset: TileSetArgs,

    #[command(flatten)]
    pub viewport: ViewportArgs,

    /// Zoom level to plan for.
    #[arg(long, default_value_t = ZoomLevel::Default)]
    pub level: ZoomLevel,

    /// Print JSON instead of a table.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl PlanConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.tileset.validate()?;
        self.viewport.validate()
    }
}

// =============================================================================
// View Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct ViewConfig {
    #[command(flatten)]
    pub tileset: TileSetArgs,

    #[command(flatten)]
    pub viewport: ViewportArgs,

    /// Zoom in this many levels after the first fill.
    #[arg(long, default_value_t = 0)]
    pub zoom_in: u32,

    /// Run the off-screen cleanup before reporting.
    #[arg(long, default_value_t = false)]
    pub cleanup: bool,

    /// Maximum number of tiles kept in the cache.
    #[arg(long, default_value_t = DEFAULT_TILE_CACHE_CAPACITY, env = "TILE_VIEWER_CACHE_TILES")]
    pub cache_tiles: usize,

    /// Number of tiles decoded concurrently.
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_DECODES, env = "TILE_VIEWER_MAX_DECODES")]
    pub max_decodes: usize,

    /// Print JSON instead of a table.
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl ViewConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.tileset.validate()?;
        self.viewport.validate()?;

        if self.cache_tiles == 0 {
            return Err("cache_tiles must be greater than 0".to_string());
        }
        if self.max_decodes == 0 {
            return Err("max_decodes must be greater than 0".to_string());
        }
        Ok(())
    }
}

// =============================================================================
// Check Command
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    #[command(flatten)]
    pub tileset: TileSetArgs,

    /// Only check this zoom level.
    #[arg(long)]
    pub level: Option<ZoomLevel>,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl CheckConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.tileset.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
