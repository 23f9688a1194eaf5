//! Zoom level transition tests.

use super::test_utils::*;

use std::time::Duration;
use tile_viewer::geometry::{Point, Size};
use tile_viewer::viewer::{
    DisplaySurface, HeadlessSurface, NodeContent, TiledViewer, TouchAction, TouchEvent, TouchPoint,
    ViewerSettings,
};
use tile_viewer::zoom::{ZoomLevel, ZoomStateMachine};

fn pinch(action: TouchAction, separation: f32) -> TouchEvent {
    TouchEvent::new(
        action,
        vec![
            TouchPoint::new(100.0, 100.0),
            TouchPoint::new(100.0 + separation, 100.0),
        ],
    )
}

#[tokio::test]
async fn test_zoom_up_preserves_proportional_scroll() {
    let (mut viewer, _source) = create_tiger_viewer().await;
    let observer = RecordingObserver::default();
    viewer.set_observer(observer.clone());

    viewer.on_size_changed();
    viewer.drain_loads().await;
    viewer.surface_mut().scroll_to(Point::new(200, 150));

    assert!(viewer.zoom_up().await);

    assert_eq!(viewer.current_zoom_level(), ZoomLevel::Level1);
    assert_eq!(viewer.surface().content_size(), Size::new(1600, 1200));
    assert_eq!(viewer.surface().scroll_offset(), Point::new(400, 300));
    assert_eq!(observer.levels(), vec![ZoomLevel::Level1]);
}

#[tokio::test]
async fn test_zoom_round_trip_returns_to_same_scroll() {
    let (mut viewer, _source) = create_tiger_viewer().await;

    viewer.surface_mut().scroll_to(Point::new(120, 90));
    viewer.zoom_up().await;
    assert_eq!(viewer.surface().scroll_offset(), Point::new(240, 180));

    viewer.zoom_down().await;
    assert_eq!(viewer.current_zoom_level(), ZoomLevel::Default);
    assert_eq!(viewer.surface().scroll_offset(), Point::new(120, 90));
}

#[tokio::test]
async fn test_zoom_replaces_every_tile() {
    let (mut viewer, source) = create_tiger_viewer().await;

    viewer.on_size_changed();
    viewer.drain_loads().await;
    source.reset_tracking().await;

    viewer.zoom_up().await;
    // The old container is gone before any new tile arrives
    assert_eq!(viewer.surface().node_count(), 0);
    assert!(viewer.cache().is_empty().await);

    viewer.drain_loads().await;

    let requests = source.get_requests().await;
    assert_eq!(requests.len(), 20);
    assert!(requests.iter().all(|path| path.starts_with("tiger1600/")));

    for (coord, _) in viewer.surface().tiles() {
        let node = viewer.surface().tile_node(coord).unwrap();
        let NodeContent::Tile { tile, .. } = &viewer.surface().node(node).unwrap().content else {
            panic!("tile node expected");
        };
        assert_eq!(tile.image().to_rgb8().get_pixel(0, 0).0, LEVEL1_COLOR);
    }
}

#[tokio::test]
async fn test_late_tiles_from_previous_level_are_dropped() {
    let (mut viewer, _source) = create_tiger_viewer().await;

    // Zoom while the first pass is still in flight
    viewer.on_size_changed();
    viewer.zoom_up().await;
    viewer.drain_loads().await;

    assert!(viewer.stats().stale_dropped > 0);
    assert_eq!(viewer.surface().tiles().len(), 20);
    assert_eq!(viewer.stats().tiles_attached, 20);
}

#[tokio::test]
async fn test_cleanup_runs_after_slow_pass_from_previous_level() {
    let tracking = TrackingAssetSource::new();
    tracking.populate(&tiger_default(), DEFAULT_COLOR).await;
    tracking.populate(&tiger_level1(), LEVEL1_COLOR).await;
    let source = SlowAssetSource::new(tracking, "tiger800/", Duration::from_millis(300));

    let mut zoom = ZoomStateMachine::new(tiger_default());
    zoom.add_configuration_set(ZoomLevel::Level1, tiger_level1());
    let settings = ViewerSettings::default().with_cleanup_delay(Duration::from_millis(20));
    let surface = HeadlessSurface::new(Size::new(400, 300));
    let mut viewer = TiledViewer::with_settings(surface, source, zoom, settings);

    // The default-level pass is still reading when the level 1 pass and its
    // cleanup timer complete
    viewer.on_size_changed();
    viewer.zoom_up().await;
    viewer.settle().await;

    assert!(viewer.is_idle());
    assert_eq!(viewer.stats().stale_dropped, 20);
    assert_eq!(viewer.stats().cleanup_passes, 1);
    assert_eq!(viewer.surface().tiles().len(), 12);
}

#[tokio::test]
async fn test_zoom_limits() {
    let (mut viewer, _source) = create_tiger_viewer().await;

    assert!(viewer.can_zoom_further_up());
    assert!(!viewer.can_zoom_further_down());
    assert!(!viewer.zoom_down().await);

    viewer.zoom_up().await;
    assert!(!viewer.can_zoom_further_up());
    assert!(viewer.can_zoom_further_down());
    assert!(!viewer.zoom_up().await);
    assert_eq!(viewer.current_zoom_level(), ZoomLevel::Level1);
}

#[tokio::test]
async fn test_unbound_level_is_noop() {
    let (mut viewer, _source) = create_tiger_viewer().await;
    let observer = RecordingObserver::default();
    viewer.set_observer(observer.clone());

    assert!(!viewer.change_zoom_level(ZoomLevel::Level3).await);
    assert!(!viewer.change_zoom_level(ZoomLevel::Default).await);

    assert_eq!(viewer.current_zoom_level(), ZoomLevel::Default);
    assert!(observer.levels().is_empty());
    assert_eq!(viewer.stats().fill_passes, 0);
}

#[tokio::test]
async fn test_configuration_added_later_enables_zoom() {
    let source = TrackingAssetSource::new();
    source.populate(&tiger_default(), DEFAULT_COLOR).await;
    source.populate(&tiger_level1(), LEVEL1_COLOR).await;

    let surface = HeadlessSurface::new(Size::new(400, 300));
    let mut viewer = TiledViewer::new(surface, source, tiger_default());
    assert!(!viewer.can_zoom_further_up());

    viewer.add_configuration_set(ZoomLevel::Level1, tiger_level1());
    assert!(viewer.can_zoom_further_up());
    assert!(viewer.zoom_up().await);
}

#[tokio::test]
async fn test_markers_survive_zoom() {
    let (mut viewer, _source) = create_tiger_viewer().await;
    viewer.add_marker(300, 200, "eye");

    viewer.on_size_changed();
    viewer.drain_loads().await;
    viewer.zoom_up().await;
    viewer.drain_loads().await;

    assert_eq!(viewer.markers().len(), 1);
    let markers = viewer.surface().markers();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].1.origin(), Point::new(284, 184));
}

#[tokio::test]
async fn test_pinch_gesture_steps_levels() {
    let (mut viewer, _source) = create_tiger_viewer().await;
    let observer = RecordingObserver::default();
    viewer.set_observer(observer.clone());

    assert!(viewer.on_touch_event(&pinch(TouchAction::PointerDown, 100.0)).await);
    assert!(viewer.on_touch_event(&pinch(TouchAction::Move, 150.0)).await);
    assert_eq!(viewer.current_zoom_level(), ZoomLevel::Default);

    assert!(viewer.on_touch_event(&pinch(TouchAction::Move, 190.0)).await);
    assert_eq!(viewer.current_zoom_level(), ZoomLevel::Level1);

    // Pinch ends; the remaining finger must not scroll
    assert!(viewer.on_touch_event(&pinch(TouchAction::PointerUp, 190.0)).await);
    let last = TouchEvent::new(TouchAction::Move, vec![TouchPoint::new(120.0, 140.0)]);
    assert!(viewer.on_touch_event(&last).await);
    let lift = TouchEvent::new(TouchAction::Up, vec![TouchPoint::new(120.0, 140.0)]);
    assert!(viewer.on_touch_event(&lift).await);

    let scroll = TouchEvent::new(TouchAction::Down, vec![TouchPoint::new(10.0, 10.0)]);
    assert!(!viewer.on_touch_event(&scroll).await);

    assert_eq!(observer.levels(), vec![ZoomLevel::Level1]);
}
