//! Test utilities for integration tests.
//!
//! This module provides a tracking asset source, a recording observer, and
//! helpers for building PNG tile sets in memory.

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

use tile_viewer::asset::AssetSource;
use tile_viewer::error::AssetError;
use tile_viewer::geometry::Size;
use tile_viewer::tile::TileCoord;
use tile_viewer::viewer::{HeadlessSurface, Marker, TiledViewer, ViewerObserver, ViewerSettings};
use tile_viewer::zoom::{ZoomConfigurationSet, ZoomLevel, ZoomStateMachine};

pub const DEFAULT_COLOR: [u8; 3] = [230, 140, 40];
pub const LEVEL1_COLOR: [u8; 3] = [40, 90, 230];

// =============================================================================
// Tile Fixtures
// =============================================================================

/// Encode a solid-color PNG tile.
pub fn create_png_tile(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode PNG tile");
    out.into_inner()
}

/// Bytes that no decoder accepts.
pub fn corrupt_tile() -> Vec<u8> {
    vec![0x89, b'P', b'N', b'G', 0, 0, 0, 0, 1, 2, 3]
}

/// The 800x600 default level of the tiger sample.
pub fn tiger_default() -> ZoomConfigurationSet {
    ZoomConfigurationSet::new("tiger800/crop_%col%_%row%.png", 100, 100, 800, 600).unwrap()
}

/// The 1600x1200 first zoom level of the tiger sample.
pub fn tiger_level1() -> ZoomConfigurationSet {
    ZoomConfigurationSet::new("tiger1600/crop_%col%_%row%.png", 100, 100, 1600, 1200).unwrap()
}

// =============================================================================
// Tracking Asset Source
// =============================================================================

/// An in-memory asset source that records every read.
///
/// Clones share assets and tracking, so tests can keep a handle after moving
/// one into a viewer.
#[derive(Clone, Default)]
pub struct TrackingAssetSource {
    assets: Arc<RwLock<HashMap<String, Bytes>>>,
    request_count: Arc<AtomicUsize>,
    requests: Arc<RwLock<Vec<String>>>,
}

impl TrackingAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, path: impl Into<String>, data: impl Into<Bytes>) {
        self.assets.write().await.insert(path.into(), data.into());
    }

    /// Add every tile of a level, all in one color.
    pub async fn populate(&self, config: &ZoomConfigurationSet, color: [u8; 3]) {
        let tile = Bytes::from(create_png_tile(
            config.tile_width(),
            config.tile_height(),
            color,
        ));
        let (cols, rows) = config.grid_size();
        let mut assets = self.assets.write().await;
        for row in 0..rows {
            for col in 0..cols {
                assets.insert(config.tile_path(TileCoord::new(col, row)), tile.clone());
            }
        }
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub async fn get_requests(&self) -> Vec<String> {
        let mut requests = self.requests.read().await.clone();
        requests.sort();
        requests
    }

    pub async fn reset_tracking(&self) {
        self.request_count.store(0, Ordering::SeqCst);
        self.requests.write().await.clear();
    }
}

#[async_trait]
impl AssetSource for TrackingAssetSource {
    async fn open_for_read(&self, path: &str) -> Result<Bytes, AssetError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.write().await.push(path.to_string());

        self.assets
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}

/// Wraps a [`TrackingAssetSource`], delaying reads under one path prefix.
#[derive(Clone)]
pub struct SlowAssetSource {
    inner: TrackingAssetSource,
    prefix: String,
    delay: Duration,
}

impl SlowAssetSource {
    pub fn new(inner: TrackingAssetSource, prefix: impl Into<String>, delay: Duration) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
            delay,
        }
    }
}

#[async_trait]
impl AssetSource for SlowAssetSource {
    async fn open_for_read(&self, path: &str) -> Result<Bytes, AssetError> {
        if path.starts_with(&self.prefix) {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.open_for_read(path).await
    }
}

// =============================================================================
// Recording Observer
// =============================================================================

/// Observer that records every callback.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    levels: Arc<Mutex<Vec<ZoomLevel>>>,
    clicks: Arc<Mutex<Vec<Marker>>>,
}

impl RecordingObserver {
    pub fn levels(&self) -> Vec<ZoomLevel> {
        self.levels.lock().unwrap().clone()
    }

    pub fn clicks(&self) -> Vec<Marker> {
        self.clicks.lock().unwrap().clone()
    }
}

impl ViewerObserver for RecordingObserver {
    fn zoom_level_changed(&mut self, level: ZoomLevel) {
        self.levels.lock().unwrap().push(level);
    }

    fn marker_clicked(&mut self, marker: &Marker) {
        self.clicks.lock().unwrap().push(marker.clone());
    }
}

// =============================================================================
// Viewer Setup
// =============================================================================

pub type TestViewer = TiledViewer<HeadlessSurface, TrackingAssetSource>;

/// A 400x300 viewer over the two-level tiger sample.
pub async fn create_tiger_viewer() -> (TestViewer, TrackingAssetSource) {
    create_tiger_viewer_with(ViewerSettings::default()).await
}

pub async fn create_tiger_viewer_with(settings: ViewerSettings) -> (TestViewer, TrackingAssetSource) {
    let source = TrackingAssetSource::new();
    source.populate(&tiger_default(), DEFAULT_COLOR).await;
    source.populate(&tiger_level1(), LEVEL1_COLOR).await;

    let mut zoom = ZoomStateMachine::new(tiger_default());
    zoom.add_configuration_set(ZoomLevel::Level1, tiger_level1());

    let surface = HeadlessSurface::new(Size::new(400, 300));
    let viewer = TiledViewer::with_settings(surface, source.clone(), zoom, settings);
    (viewer, source)
}
