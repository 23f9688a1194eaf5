//! Scroll debouncing and delayed cleanup, on a paused clock.

use super::test_utils::*;

use std::time::Duration;
use tile_viewer::geometry::Point;

#[tokio::test(start_paused = true)]
async fn test_scroll_burst_runs_one_fill_for_latest_position() {
    let (mut viewer, _source) = create_tiger_viewer().await;

    viewer.surface_mut().scroll_to(Point::new(100, 50));
    viewer.on_scroll_changed();
    tokio::time::advance(Duration::from_millis(50)).await;

    viewer.surface_mut().scroll_to(Point::new(200, 100));
    viewer.on_scroll_changed();

    viewer.settle().await;

    assert_eq!(viewer.stats().fill_passes, 1);
    assert_eq!(viewer.stats().last_fill_scroll, Some(Point::new(200, 100)));
}

#[tokio::test(start_paused = true)]
async fn test_fill_waits_for_quiet_period() {
    let (mut viewer, _source) = create_tiger_viewer().await;

    viewer.on_scroll_changed();
    tokio::time::advance(Duration::from_millis(150)).await;
    assert_eq!(viewer.process_pending().await, 0);
    assert_eq!(viewer.stats().fill_passes, 0);

    // FillDue arrives at 200ms
    viewer.process_next().await;
    assert_eq!(viewer.stats().fill_passes, 1);
}

#[tokio::test(start_paused = true)]
async fn test_separate_scrolls_fill_separately() {
    let (mut viewer, _source) = create_tiger_viewer().await;

    viewer.surface_mut().scroll_to(Point::new(100, 0));
    viewer.on_scroll_changed();
    viewer.process_next().await;

    viewer.surface_mut().scroll_to(Point::new(300, 0));
    viewer.on_scroll_changed();
    viewer.settle().await;

    assert_eq!(viewer.stats().fill_passes, 2);
    assert_eq!(viewer.stats().last_fill_scroll, Some(Point::new(300, 0)));
}

#[tokio::test(start_paused = true)]
async fn test_size_change_fills_immediately() {
    let (mut viewer, _source) = create_tiger_viewer().await;

    viewer.on_size_changed();
    assert_eq!(viewer.stats().fill_passes, 1);
    assert_eq!(viewer.passes_in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cleanup_follows_fill() {
    let (mut viewer, _source) = create_tiger_viewer().await;

    viewer.on_size_changed();
    viewer.drain_loads().await;
    assert_eq!(viewer.stats().cleanup_passes, 0);
    assert_eq!(viewer.surface().tiles().len(), 20);

    viewer.settle().await;

    // The margin column and row are outside the visible region
    assert_eq!(viewer.stats().cleanup_passes, 1);
    assert_eq!(viewer.surface().tiles().len(), 12);
    assert!(viewer.is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_zoom_cancels_pending_fill() {
    let (mut viewer, _source) = create_tiger_viewer().await;

    viewer.on_scroll_changed();
    viewer.zoom_up().await;
    viewer.settle().await;

    // Only the fill started by the zoom ran
    assert_eq!(viewer.stats().fill_passes, 1);
    assert_eq!(viewer.stats().zoom_changes, 1);
}
