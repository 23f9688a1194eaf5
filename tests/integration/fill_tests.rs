//! Fill pass tests: planning, loading and attaching tiles.

use super::test_utils::*;

use tile_viewer::geometry::{PixelRect, Point, Size};
use tile_viewer::tile::TileCoord;
use tile_viewer::viewer::{DisplaySurface, ViewerSettings};

#[tokio::test]
async fn test_initial_fill_loads_twenty_tiles() {
    let (mut viewer, source) = create_tiger_viewer().await;

    viewer.on_size_changed();
    viewer.drain_loads().await;

    let tiles = viewer.surface().tiles();
    assert_eq!(tiles.len(), 20);
    assert_eq!(source.request_count(), 20);

    // Five columns by four rows, prefetch margin included
    for col in 0..5 {
        for row in 0..4 {
            assert!(
                viewer.surface().tile_node(TileCoord::new(col, row)).is_some(),
                "missing tile ({col}, {row})"
            );
        }
    }

    // %col% receives the row index
    let requests = source.get_requests().await;
    assert!(requests.contains(&"tiger800/crop_3_4.png".to_string()));
    assert!(!requests.contains(&"tiger800/crop_4_3.png".to_string()));
}

#[tokio::test]
async fn test_tiles_are_placed_on_the_grid() {
    let (mut viewer, _source) = create_tiger_viewer().await;

    viewer.on_size_changed();
    viewer.drain_loads().await;

    for (coord, bounds) in viewer.surface().tiles() {
        assert_eq!(
            bounds,
            PixelRect::new(coord.col as i32 * 100, coord.row as i32 * 100, 100, 100)
        );
    }
}

#[tokio::test]
async fn test_resident_tiles_are_not_reloaded() {
    let (mut viewer, source) = create_tiger_viewer().await;

    viewer.on_size_changed();
    viewer.drain_loads().await;
    source.reset_tracking().await;

    // Scroll one tile right: only the new margin column is missing
    viewer.surface_mut().scroll_to(Point::new(100, 0));
    viewer.on_size_changed();
    viewer.drain_loads().await;

    let requests = source.get_requests().await;
    assert_eq!(
        requests,
        vec![
            "tiger800/crop_0_5.png",
            "tiger800/crop_1_5.png",
            "tiger800/crop_2_5.png",
            "tiger800/crop_3_5.png",
        ]
    );
    assert_eq!(viewer.surface().tiles().len(), 24);
}

#[tokio::test]
async fn test_scroll_near_edge_stays_on_grid() {
    let (mut viewer, source) = create_tiger_viewer().await;

    viewer.surface_mut().scroll_to(Point::new(400, 300));
    viewer.on_size_changed();
    viewer.drain_loads().await;

    // Columns 4..=7, rows 3..=5; the margin falls outside the image
    assert_eq!(viewer.surface().tiles().len(), 12);
    assert_eq!(viewer.stats().tiles_failed, 0);
    assert_eq!(source.request_count(), 12);
}

#[tokio::test]
async fn test_cleanup_detaches_offscreen_tiles() {
    let (mut viewer, _source) = create_tiger_viewer().await;

    viewer.on_size_changed();
    viewer.drain_loads().await;
    viewer.surface_mut().scroll_to(Point::new(300, 200));

    let removed = viewer.cleanup_old_tiles().await;

    // Visible region is (300, 200)..(700, 500)
    let remaining = viewer.surface().tiles();
    assert_eq!(removed, 20 - remaining.len());
    assert!(remaining
        .iter()
        .all(|(coord, _)| coord.col >= 3 && coord.row >= 2));
    assert_eq!(viewer.cache().len().await, remaining.len());
}

#[tokio::test]
async fn test_cache_bound_detaches_evicted_tiles() {
    let settings = ViewerSettings::default().with_cache_capacity(8);
    let (mut viewer, _source) = create_tiger_viewer_with(settings).await;

    viewer.on_size_changed();
    viewer.drain_loads().await;

    assert_eq!(viewer.stats().tiles_attached, 20);
    assert_eq!(viewer.stats().tiles_evicted, 12);
    assert_eq!(viewer.cache().len().await, 8);
    assert_eq!(viewer.surface().tiles().len(), 8);
}

#[tokio::test]
async fn test_tile_dropped_by_surface_is_reloaded() {
    let (mut viewer, source) = create_tiger_viewer().await;

    viewer.on_size_changed();
    viewer.drain_loads().await;
    source.reset_tracking().await;

    // The host discards one node behind the engine's back
    let node = viewer.surface().tile_node(TileCoord::new(1, 1)).unwrap();
    viewer.surface_mut().detach(node);
    assert!(!viewer.cache().contains(TileCoord::new(1, 1)).await);

    viewer.on_size_changed();
    viewer.drain_loads().await;

    assert_eq!(source.get_requests().await, vec!["tiger800/crop_1_1.png"]);
    assert_eq!(viewer.surface().tiles().len(), 20);
}

#[tokio::test]
async fn test_markers_stay_above_tiles() {
    let (mut viewer, _source) = create_tiger_viewer().await;
    viewer.add_marker(150, 150, "nose");

    viewer.on_size_changed();
    viewer.drain_loads().await;

    let surface = viewer.surface();
    assert_eq!(
        surface.markers(),
        vec![(0, PixelRect::new(134, 134, 32, 32))]
    );
    assert_eq!(surface.node_count(), 21);
    assert_eq!(surface.content_size(), Size::new(800, 600));
}

#[tokio::test]
async fn test_tap_reports_marker() {
    let (mut viewer, _source) = create_tiger_viewer().await;
    let observer = RecordingObserver::default();
    viewer.set_observer(observer.clone());
    viewer.add_marker(500, 400, "tail");

    viewer.surface_mut().scroll_to(Point::new(300, 200));

    // View point (200, 200) is content point (500, 400)
    let hit = viewer.on_tap(Point::new(200, 200)).unwrap();
    assert_eq!(hit.description, "tail");
    assert!(viewer.on_tap(Point::new(0, 0)).is_none());

    let clicks = observer.clicks();
    assert_eq!(clicks.len(), 1);
    assert_eq!((clicks[0].x, clicks[0].y), (500, 400));
}
