//! The tiled viewer engine.
//!
//! [`TiledViewer`] runs on the host's UI-affine task. It owns the display
//! surface and every piece of state except the tile cache, which it shares
//! with the background loader.
//!
//! Background work never touches the surface. Fill passes, debounced timers
//! and decoded tiles all report back through one internal event queue, and
//! the host pumps that queue with [`TiledViewer::process_next`],
//! [`TiledViewer::process_pending`], [`TiledViewer::drain_loads`] or
//! [`TiledViewer::settle`]. Attaching tiles therefore always happens on the
//! task that owns the viewer, one tile at a time.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::asset::{AssetSource, ImageTileDecoder, TileDecoder, TileSetManifest};
use crate::error::ManifestError;
use crate::geometry::{PixelRect, Point, Size};
use crate::tile::{plan, LoadEvent, TileCache, TileHandle, TileLoader};
use crate::zoom::{proportional_scroll, ZoomConfigurationSet, ZoomLevel, ZoomStateMachine};

use super::debounce::Debouncer;
use super::gesture::{GestureOutcome, PinchTracker, TouchEvent, DEFAULT_ZOOM_JUMP};
use super::marker::{Marker, MarkerLayer, DEFAULT_MARKER_ICON_SIZE};
use super::surface::{DisplaySurface, NodeContent};

/// Quiet period after the last scroll before a fill pass runs.
pub const DEFAULT_FILL_DELAY: Duration = Duration::from_millis(200);

/// Delay between the end of a fill pass and the off-screen cleanup.
pub const DEFAULT_CLEANUP_DELAY: Duration = Duration::from_millis(1000);

// =============================================================================
// Settings, Stats, Observer
// =============================================================================

/// Engine tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSettings {
    /// Scroll debounce delay
    pub fill_delay: Duration,

    /// Cleanup delay after a fill pass completes
    pub cleanup_delay: Duration,

    /// Pinch separation change (pixels) that steps one zoom level
    pub zoom_jump: f32,

    /// Maximum number of tiles in the cache
    pub cache_capacity: usize,

    /// Tiles decoded concurrently per fill pass
    pub max_concurrent_decodes: usize,

    /// Size of marker icons
    pub marker_icon_size: Size,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            fill_delay: DEFAULT_FILL_DELAY,
            cleanup_delay: DEFAULT_CLEANUP_DELAY,
            zoom_jump: DEFAULT_ZOOM_JUMP,
            cache_capacity: crate::tile::DEFAULT_TILE_CACHE_CAPACITY,
            max_concurrent_decodes: crate::tile::DEFAULT_MAX_CONCURRENT_DECODES,
            marker_icon_size: DEFAULT_MARKER_ICON_SIZE,
        }
    }
}

impl ViewerSettings {
    pub fn with_fill_delay(mut self, delay: Duration) -> Self {
        self.fill_delay = delay;
        self
    }

    pub fn with_cleanup_delay(mut self, delay: Duration) -> Self {
        self.cleanup_delay = delay;
        self
    }

    pub fn with_zoom_jump(mut self, zoom_jump: f32) -> Self {
        self.zoom_jump = zoom_jump;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_max_concurrent_decodes(mut self, max: usize) -> Self {
        self.max_concurrent_decodes = max;
        self
    }

    pub fn with_marker_icon_size(mut self, size: Size) -> Self {
        self.marker_icon_size = size;
        self
    }
}

/// Counters describing what the engine has done so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewerStats {
    pub fill_passes: u64,
    pub cleanup_passes: u64,
    pub zoom_changes: u64,
    pub tiles_attached: u64,
    pub tiles_failed: u64,
    /// Tiles that arrived after a zoom change and were discarded
    pub stale_dropped: u64,
    /// Tiles detached by cleanup or by the cache bound
    pub tiles_evicted: u64,
    /// Scroll offset the most recent fill pass planned for
    pub last_fill_scroll: Option<Point>,
}

/// Host callbacks.
pub trait ViewerObserver: Send {
    /// The zoom level changed; refresh zoom controls.
    fn zoom_level_changed(&mut self, _level: ZoomLevel) {}

    /// A marker icon was tapped.
    fn marker_clicked(&mut self, _marker: &Marker) {}
}

#[derive(Debug)]
enum EngineEvent {
    FillDue { ticket: u64 },
    CleanupDue { ticket: u64 },
    Tile { generation: u64, event: LoadEvent },
    PassFinished { generation: u64 },
}

// =============================================================================
// Tiled Viewer
// =============================================================================

/// Lazily loaded, scrollable, zoomable view onto a pre-tiled image.
///
/// # Type Parameters
///
/// * `S` - The host's display surface
/// * `A` - Where tile bytes come from
/// * `D` - How tile bytes are decoded
///
/// # Example
///
/// ```no_run
/// use tile_viewer::asset::FsAssetSource;
/// use tile_viewer::geometry::Size;
/// use tile_viewer::viewer::{HeadlessSurface, TiledViewer};
/// use tile_viewer::zoom::ZoomConfigurationSet;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ZoomConfigurationSet::new("tiger/crop_%col%_%row%.png", 100, 100, 800, 600)?;
///     let surface = HeadlessSurface::new(Size::new(400, 300));
///     let mut viewer = TiledViewer::new(surface, FsAssetSource::new("assets"), config);
///
///     viewer.on_size_changed();
///     viewer.drain_loads().await;
///     println!("{} tiles on screen", viewer.surface().tiles().len());
///     Ok(())
/// }
/// ```
pub struct TiledViewer<S: DisplaySurface, A: AssetSource, D: TileDecoder = ImageTileDecoder> {
    surface: S,
    zoom: ZoomStateMachine,
    cache: Arc<TileCache>,
    loader: TileLoader<A, D>,
    markers: MarkerLayer,
    pinch: PinchTracker,
    fill_debounce: Debouncer,
    cleanup_debounce: Debouncer,
    observer: Option<Box<dyn ViewerObserver>>,

    /// Bumped on every zoom change; tiles from older generations are dropped
    generation: u64,
    passes_in_flight: usize,
    /// A cleanup fired while passes were still running
    cleanup_deferred: bool,

    stats: ViewerStats,
    settings: ViewerSettings,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: mpsc::UnboundedReceiver<EngineEvent>,
}

impl<S: DisplaySurface, A: AssetSource> TiledViewer<S, A> {
    /// Create a viewer showing `default` at [`ZoomLevel::Default`].
    pub fn new(surface: S, source: A, default: ZoomConfigurationSet) -> Self {
        Self::with_settings(
            surface,
            source,
            ZoomStateMachine::new(default),
            ViewerSettings::default(),
        )
    }

    pub fn with_settings(
        surface: S,
        source: A,
        zoom: ZoomStateMachine,
        settings: ViewerSettings,
    ) -> Self {
        let loader = TileLoader::new(source).with_max_concurrent(settings.max_concurrent_decodes);
        Self::with_loader(surface, loader, zoom, settings)
    }

    /// Create a viewer with every level of a tile set manifest bound.
    pub fn from_manifest(
        surface: S,
        source: A,
        manifest: TileSetManifest,
        settings: ViewerSettings,
    ) -> Result<Self, ManifestError> {
        let zoom = manifest.into_zoom_state()?;
        Ok(Self::with_settings(surface, source, zoom, settings))
    }
}

impl<S: DisplaySurface, A: AssetSource, D: TileDecoder> TiledViewer<S, A, D> {
    /// Create a viewer around an existing loader.
    ///
    /// The surface's content is reset to the current level's image size.
    pub fn with_loader(
        mut surface: S,
        loader: TileLoader<A, D>,
        zoom: ZoomStateMachine,
        settings: ViewerSettings,
    ) -> Self {
        surface.reset_content(zoom.current_configuration().image_size());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            surface,
            zoom,
            cache: Arc::new(TileCache::with_capacity(settings.cache_capacity)),
            loader,
            markers: MarkerLayer::new(settings.marker_icon_size),
            pinch: PinchTracker::new(settings.zoom_jump),
            fill_debounce: Debouncer::new(settings.fill_delay),
            cleanup_debounce: Debouncer::new(settings.cleanup_delay),
            observer: None,
            generation: 0,
            passes_in_flight: 0,
            cleanup_deferred: false,
            stats: ViewerStats::default(),
            settings,
            events_tx,
            events_rx,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, e.g. to resize or scroll it.
    ///
    /// Call [`on_size_changed`](Self::on_size_changed) or
    /// [`on_scroll_changed`](Self::on_scroll_changed) afterwards.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn cache(&self) -> &Arc<TileCache> {
        &self.cache
    }

    pub fn zoom(&self) -> &ZoomStateMachine {
        &self.zoom
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn stats(&self) -> &ViewerStats {
        &self.stats
    }

    pub fn markers(&self) -> &[Marker] {
        self.markers.markers()
    }

    pub fn passes_in_flight(&self) -> usize {
        self.passes_in_flight
    }

    /// Returns `true` when no fill pass is running and no timer is pending.
    pub fn is_idle(&self) -> bool {
        self.passes_in_flight == 0
            && !self.fill_debounce.is_pending()
            && !self.cleanup_debounce.is_pending()
    }

    // -------------------------------------------------------------------------
    // Host API
    // -------------------------------------------------------------------------

    /// Bind a configuration set to a zoom level.
    ///
    /// Takes effect on the next fill pass or zoom transition.
    pub fn add_configuration_set(&mut self, level: ZoomLevel, set: ZoomConfigurationSet) {
        debug!(level = %level, template = set.template(), "configuration set bound");
        self.zoom.add_configuration_set(level, set);
    }

    /// Add a marker at `(x, y)` in the current level's image pixels.
    pub fn add_marker(&mut self, x: i32, y: i32, description: impl Into<String>) {
        self.markers.add(Marker::new(x, y, description));
        self.markers.render(&mut self.surface);
    }

    pub fn set_observer(&mut self, observer: impl ViewerObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn current_zoom_level(&self) -> ZoomLevel {
        self.zoom.current()
    }

    pub fn can_zoom_further_up(&self) -> bool {
        self.zoom.can_zoom_further_up()
    }

    pub fn can_zoom_further_down(&self) -> bool {
        self.zoom.can_zoom_further_down()
    }

    /// Step one zoom level up. Returns `false` at the top level.
    pub async fn zoom_up(&mut self) -> bool {
        let target = self.zoom.current().up();
        self.change_zoom_level(target).await
    }

    /// Step one zoom level down. Returns `false` at the bottom level.
    pub async fn zoom_down(&mut self) -> bool {
        let target = self.zoom.current().down();
        self.change_zoom_level(target).await
    }

    /// Switch to `target`, keeping the proportional scroll position.
    ///
    /// Returns `false` without doing anything if `target` is the current
    /// level or has no configuration set.
    pub async fn change_zoom_level(&mut self, target: ZoomLevel) -> bool {
        let scroll = self.surface.scroll_offset();
        let old_size = self.surface.content_size();

        let Some(transition) = self.zoom.transition(target) else {
            debug!(level = %target, "zoom change ignored");
            return false;
        };

        self.generation += 1;
        self.stats.zoom_changes += 1;
        self.fill_debounce.cancel();
        self.cleanup_debounce.cancel();

        let cleared = self.cache.clear().await;
        let new_size = transition.configuration.image_size();
        self.surface.reset_content(new_size);
        self.markers.forget_nodes();

        let target_scroll = proportional_scroll(scroll, old_size, new_size);
        self.surface.smooth_scroll_to(target_scroll);

        info!(
            from = %transition.from,
            to = %transition.to,
            cleared = cleared.len(),
            width = new_size.width,
            height = new_size.height,
            "zoom level changed"
        );

        if let Some(observer) = self.observer.as_mut() {
            observer.zoom_level_changed(transition.to);
        }

        self.fill_tiles();
        true
    }

    /// The view was laid out or resized: fill immediately.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn on_size_changed(&mut self) {
        self.fill_tiles();
    }

    /// The view scrolled: fill once scrolling has paused.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn on_scroll_changed(&mut self) {
        let tx = self.events_tx.clone();
        let ticket = self.fill_debounce.trigger(move |ticket| {
            let _ = tx.send(EngineEvent::FillDue { ticket });
        });
        debug!(ticket, scroll = ?self.surface.scroll_offset(), "fill scheduled");
    }

    /// Feed a touch event through pinch detection.
    ///
    /// Returns `true` if the engine consumed the event; `false` means the
    /// host should apply its normal scroll handling.
    pub async fn on_touch_event(&mut self, event: &TouchEvent) -> bool {
        match self.pinch.on_touch(event) {
            GestureOutcome::Forward => false,
            GestureOutcome::Consumed => true,
            GestureOutcome::ZoomIn => {
                self.zoom_up().await;
                true
            }
            GestureOutcome::ZoomOut => {
                self.zoom_down().await;
                true
            }
        }
    }

    /// A tap at `point` in view coordinates. Notifies the observer and
    /// returns the marker hit, if any.
    pub fn on_tap(&mut self, point: Point) -> Option<Marker> {
        let scroll = self.surface.scroll_offset();
        let content_point = Point::new(point.x.saturating_add(scroll.x), point.y.saturating_add(scroll.y));

        let marker = self.markers.hit_test(content_point)?.clone();
        debug!(x = marker.x, y = marker.y, description = %marker.description, "marker tapped");
        if let Some(observer) = self.observer.as_mut() {
            observer.marker_clicked(&marker);
        }
        Some(marker)
    }

    // -------------------------------------------------------------------------
    // Fill and cleanup
    // -------------------------------------------------------------------------

    /// Start a fill pass for the current viewport.
    ///
    /// Plans the visible tiles and hands the missing ones to the loader. The
    /// decoded tiles are attached as their events are processed.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn fill_tiles(&mut self) {
        let viewport = self.surface.viewport();
        let scroll = self.surface.scroll_offset();
        let config = self.zoom.current_configuration();
        let coords = plan(viewport, scroll, &config);

        self.stats.fill_passes += 1;
        self.stats.last_fill_scroll = Some(scroll);
        self.cleanup_debounce.cancel();

        debug!(
            level = %self.zoom.current(),
            generation = self.generation,
            scroll = ?scroll,
            tiles = coords.len(),
            "fill pass started"
        );

        let mut loads = self
            .loader
            .load_missing(coords, config, Arc::clone(&self.cache));
        let generation = self.generation;
        let tx = self.events_tx.clone();
        self.passes_in_flight += 1;

        tokio::spawn(async move {
            while let Some(event) = loads.recv().await {
                if tx.send(EngineEvent::Tile { generation, event }).is_err() {
                    return;
                }
            }
            let _ = tx.send(EngineEvent::PassFinished { generation });
        });
    }

    /// Detach every tile that no longer intersects the visible region.
    ///
    /// Cache entries whose node the surface no longer holds are dropped as
    /// well. Returns the number of tiles removed.
    pub async fn cleanup_old_tiles(&mut self) -> usize {
        let visible =
            PixelRect::from_origin_size(self.surface.scroll_offset(), self.surface.measured_size());

        let surface = &self.surface;
        let evicted = self
            .cache
            .evict_where(|_, handle, bounds| {
                !bounds.intersects(&visible) || !surface.contains(handle.node())
            })
            .await;

        for (_, handle) in &evicted {
            self.surface.detach(handle.node());
        }

        self.stats.cleanup_passes += 1;
        self.stats.tiles_evicted += evicted.len() as u64;
        debug!(removed = evicted.len(), visible = ?visible, "cleanup pass finished");
        evicted.len()
    }

    // -------------------------------------------------------------------------
    // Event pump
    // -------------------------------------------------------------------------

    /// Wait for the next engine event and handle it.
    pub async fn process_next(&mut self) {
        if let Some(event) = self.events_rx.recv().await {
            self.dispatch(event).await;
        }
    }

    /// Handle every event already queued without waiting. Returns how many
    /// were handled.
    pub async fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.dispatch(event).await;
            handled += 1;
        }
        handled
    }

    /// Handle events until every started fill pass has finished.
    pub async fn drain_loads(&mut self) {
        while self.passes_in_flight > 0 {
            self.process_next().await;
        }
    }

    /// Handle events until the engine is idle, including pending debounced
    /// fills and the cleanup that follows them.
    pub async fn settle(&mut self) {
        while !self.is_idle() {
            self.process_next().await;
        }
    }

    async fn dispatch(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::FillDue { ticket } => {
                if self.fill_debounce.accept(ticket) {
                    self.fill_tiles();
                } else {
                    debug!(ticket, "superseded fill ignored");
                }
            }
            EngineEvent::CleanupDue { ticket } => {
                if !self.cleanup_debounce.accept(ticket) {
                    return;
                }
                if self.passes_in_flight == 0 {
                    self.cleanup_old_tiles().await;
                } else {
                    debug!(passes = self.passes_in_flight, "cleanup deferred until passes finish");
                    self.cleanup_deferred = true;
                }
            }
            EngineEvent::Tile { generation, event } => {
                if generation != self.generation {
                    debug!(tile = %event.coord(), generation, "dropping tile from previous zoom level");
                    self.stats.stale_dropped += 1;
                    return;
                }
                self.publish(event).await;
            }
            EngineEvent::PassFinished { generation } => {
                self.passes_in_flight = self.passes_in_flight.saturating_sub(1);
                if generation != self.generation {
                    // The last pass to finish owes the deferred cleanup
                    if self.passes_in_flight == 0 && self.cleanup_deferred {
                        self.schedule_cleanup();
                    }
                    return;
                }
                self.markers.render(&mut self.surface);
                self.schedule_cleanup();
                debug!(generation, attached = self.stats.tiles_attached, "fill pass finished");
            }
        }
    }

    /// Attach one decoded tile and index it.
    async fn publish(&mut self, event: LoadEvent) {
        let (coord, tile) = match event {
            LoadEvent::Loaded { coord, tile } => (coord, tile),
            LoadEvent::Failed { .. } => {
                self.stats.tiles_failed += 1;
                return;
            }
        };

        // Overlapping passes may decode the same tile twice
        if self.cache.contains(coord).await {
            debug!(tile = %coord, "tile already attached");
            return;
        }

        let config = self.zoom.current_configuration();
        let bounds = PixelRect::from_origin_size(config.tile_bounds(coord).origin(), tile.size());
        let node = self.surface.attach(
            bounds,
            NodeContent::Tile {
                coord,
                tile: Arc::clone(&tile),
            },
        );
        self.stats.tiles_attached += 1;

        let displaced = self
            .cache
            .put(coord, TileHandle::new(node, bounds, &tile))
            .await;
        if let Some((displaced_coord, handle)) = displaced {
            if handle.node() != node {
                self.surface.detach(handle.node());
            }
            if displaced_coord != coord {
                debug!(tile = %displaced_coord, "tile evicted by cache bound");
                self.stats.tiles_evicted += 1;
            }
        }
    }

    fn schedule_cleanup(&mut self) {
        self.cleanup_deferred = false;
        let tx = self.events_tx.clone();
        self.cleanup_debounce.trigger(move |ticket| {
            let _ = tx.send(EngineEvent::CleanupDue { ticket });
        });
    }
}
