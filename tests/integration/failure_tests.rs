//! Per-tile failure handling.

use super::test_utils::*;

use tile_viewer::geometry::Size;
use tile_viewer::tile::TileCoord;
use tile_viewer::viewer::{HeadlessSurface, TiledViewer};

#[tokio::test]
async fn test_corrupt_tile_is_skipped_and_retried() {
    let (mut viewer, source) = create_tiger_viewer().await;
    let broken = TileCoord::new(2, 3);
    let path = tiger_default().tile_path(broken);
    assert_eq!(path, "tiger800/crop_3_2.png");
    source.insert(path.clone(), corrupt_tile()).await;

    viewer.on_size_changed();
    viewer.drain_loads().await;

    assert_eq!(viewer.surface().tiles().len(), 19);
    assert_eq!(viewer.stats().tiles_failed, 1);
    assert!(viewer.surface().tile_node(broken).is_none());
    assert!(!viewer.cache().contains(broken).await);

    // Repair the asset; the next fill only asks for the missing tile
    source
        .insert(path.clone(), create_png_tile(100, 100, DEFAULT_COLOR))
        .await;
    source.reset_tracking().await;

    viewer.on_size_changed();
    viewer.drain_loads().await;

    assert_eq!(source.get_requests().await, vec![path]);
    assert_eq!(viewer.surface().tiles().len(), 20);
    assert!(viewer.surface().tile_node(broken).is_some());
}

#[tokio::test]
async fn test_missing_tiles_do_not_block_siblings() {
    let source = TrackingAssetSource::new();
    let config = tiger_default();
    // Only the first row exists
    for col in 0..8 {
        source
            .insert(
                config.tile_path(TileCoord::new(col, 0)),
                create_png_tile(100, 100, DEFAULT_COLOR),
            )
            .await;
    }

    let surface = HeadlessSurface::new(Size::new(400, 300));
    let mut viewer = TiledViewer::new(surface, source.clone(), config);
    viewer.on_size_changed();
    viewer.drain_loads().await;

    assert_eq!(viewer.surface().tiles().len(), 5);
    assert_eq!(viewer.stats().tiles_failed, 15);
    assert_eq!(source.request_count(), 20);
}

#[tokio::test]
async fn test_edge_tile_uses_decoded_size() {
    let (mut viewer, source) = create_tiger_viewer().await;
    let coord = TileCoord::new(0, 0);
    source
        .insert(
            tiger_default().tile_path(coord),
            create_png_tile(60, 40, DEFAULT_COLOR),
        )
        .await;

    viewer.on_size_changed();
    viewer.drain_loads().await;

    let node = viewer.surface().tile_node(coord).unwrap();
    let bounds = viewer.surface().node(node).unwrap().bounds;
    assert_eq!(bounds.size(), Size::new(60, 40));
    assert_eq!((bounds.x, bounds.y), (0, 0));
}
