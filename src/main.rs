//! Tile Viewer - headless driver for the tiled viewer engine.
//!
//! Plans, loads and checks tile sets described by a JSON manifest.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tile_viewer::{
    asset::{FsAssetSource, TileSetManifest},
    config::{CheckConfig, Cli, Command, PlanConfig, TileSetArgs, ViewConfig},
    geometry::{PixelRect, Point},
    tile::{plan, LoadEvent, TileCache, TileCoord, TileLoader},
    viewer::{DisplaySurface, HeadlessSurface, TiledViewer, ViewerSettings},
    zoom::{ZoomConfigurationSet, ZoomLevel},
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Plan(config) => run_plan(config).await,
        Command::View(config) => run_view(config).await,
        Command::Check(config) => run_check(config).await,
    }
}

/// Initialize the tracing/logging subsystem.
///
/// Logs go to stderr so that stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tile_viewer=debug"
    } else {
        "tile_viewer=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load the manifest, logging the failure.
async fn load_manifest(tileset: &TileSetArgs) -> Option<TileSetManifest> {
    match TileSetManifest::load(&tileset.manifest).await {
        Ok(manifest) => {
            debug!(
                manifest = %tileset.manifest.display(),
                levels = manifest.levels.len(),
                "manifest loaded"
            );
            Some(manifest)
        }
        Err(e) => {
            error!("Failed to load manifest: {}", e);
            None
        }
    }
}

fn print_json(value: &serde_json::Value) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Plan Command
// =============================================================================

async fn run_plan(config: PlanConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(manifest) = load_manifest(&config.tileset).await else {
        return ExitCode::FAILURE;
    };
    let zoom = match manifest.into_zoom_state() {
        Ok(zoom) => zoom,
        Err(e) => {
            error!("Invalid manifest: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let Some(level_config) = zoom.configuration(config.level) else {
        error!("Zoom level '{}' is not defined in the manifest", config.level);
        return ExitCode::FAILURE;
    };

    let viewport = PixelRect::from_origin_size(Point::ORIGIN, config.viewport.size());
    let scroll = config.viewport.scroll();
    let coords = plan(viewport, scroll, &level_config);

    if config.json {
        let tiles: Vec<_> = coords
            .iter()
            .map(|coord| {
                serde_json::json!({
                    "col": coord.col,
                    "row": coord.row,
                    "path": level_config.tile_path(*coord),
                    "bounds": level_config.tile_bounds(*coord),
                })
            })
            .collect();
        return print_json(&serde_json::json!({
            "level": config.level,
            "viewport": viewport,
            "scroll": scroll,
            "tiles": tiles,
        }));
    }

    println!(
        "Level {} ({}x{} image, {}x{} tiles)",
        config.level,
        level_config.image_width(),
        level_config.image_height(),
        level_config.tile_width(),
        level_config.tile_height()
    );
    println!(
        "Viewport {}x{} at scroll ({}, {})",
        viewport.width, viewport.height, scroll.x, scroll.y
    );
    println!();
    for coord in &coords {
        let bounds = level_config.tile_bounds(*coord);
        println!(
            "  {:<10} {:>6},{:<6} {}",
            coord.to_string(),
            bounds.x,
            bounds.y,
            level_config.tile_path(*coord)
        );
    }
    println!();
    println!("Total: {} tile(s)", coords.len());

    ExitCode::SUCCESS
}

// =============================================================================
// View Command
// =============================================================================

async fn run_view(config: ViewConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(manifest) = load_manifest(&config.tileset).await else {
        return ExitCode::FAILURE;
    };

    let root = config.tileset.asset_root();
    info!("Reading tiles from {}", root.display());

    let settings = ViewerSettings::default()
        .with_cache_capacity(config.cache_tiles)
        .with_max_concurrent_decodes(config.max_decodes);
    let surface = HeadlessSurface::new(config.viewport.size());

    let mut viewer =
        match TiledViewer::from_manifest(surface, FsAssetSource::new(root), manifest, settings) {
            Ok(viewer) => viewer,
            Err(e) => {
                error!("Invalid manifest: {}", e);
                return ExitCode::FAILURE;
            }
        };

    viewer.surface_mut().scroll_to(config.viewport.scroll());
    viewer.on_size_changed();
    viewer.drain_loads().await;

    for _ in 0..config.zoom_in {
        if !viewer.zoom_up().await {
            info!("No zoom level above {}", viewer.current_zoom_level());
            break;
        }
        viewer.drain_loads().await;
    }

    if config.cleanup {
        viewer.cleanup_old_tiles().await;
    }

    let surface = viewer.surface();
    let tiles = surface.tiles();
    let level = viewer.current_zoom_level();

    if config.json {
        let tiles: Vec<_> = tiles
            .iter()
            .map(|(coord, bounds)| serde_json::json!({ "coord": coord, "bounds": bounds }))
            .collect();
        return print_json(&serde_json::json!({
            "level": level,
            "content": surface.content_size(),
            "scroll": surface.scroll_offset(),
            "tiles": tiles,
            "stats": viewer.stats(),
        }));
    }

    let content = surface.content_size();
    let scroll = surface.scroll_offset();
    println!(
        "Level {} ({}x{}), scroll ({}, {})",
        level, content.width, content.height, scroll.x, scroll.y
    );
    println!();
    for (coord, bounds) in &tiles {
        println!(
            "  {:<10} at ({}, {}) {}x{}",
            coord.to_string(),
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height
        );
    }

    let stats = viewer.stats();
    println!();
    println!("Attached: {} tile(s)", tiles.len());
    println!(
        "Fill passes: {}, failed tiles: {}, evicted: {}",
        stats.fill_passes, stats.tiles_failed, stats.tiles_evicted
    );

    if stats.tiles_failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    // Initialize minimal logging for check command
    if config.verbose {
        init_logging(true);
    }

    println!("Tile Set Check");
    println!("══════════════");
    println!();

    if let Err(e) = config.validate() {
        println!("✗ Configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let manifest = match TileSetManifest::load(&config.tileset.manifest).await {
        Ok(manifest) => {
            println!("✓ Manifest: {}", config.tileset.manifest.display());
            manifest
        }
        Err(e) => {
            println!("✗ Manifest: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let levels = match manifest.configurations() {
        Ok(levels) => levels,
        Err(e) => {
            println!("✗ Levels: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(level) = config.level {
        if !levels.iter().any(|(l, _)| *l == level) {
            println!("✗ Level '{}' is not defined in the manifest", level);
            return ExitCode::FAILURE;
        }
    }

    let root = config.tileset.asset_root();
    println!("✓ Root: {}", root.display());
    println!();

    let loader = TileLoader::new(FsAssetSource::new(root));
    let mut all_ok = true;

    for (level, level_config) in levels {
        if config.level.is_some_and(|only| only != level) {
            continue;
        }

        let (cols, rows) = level_config.grid_size();
        let coords: Vec<_> = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| TileCoord::new(col, row)))
            .collect();
        let total = coords.len();

        print!("Checking {} ({} tiles)... ", level, total);
        let failures = check_level(&loader, level, coords, Arc::new(level_config)).await;

        if failures.is_empty() {
            println!("✓ ok");
        } else {
            all_ok = false;
            println!("✗ {} of {} failed", failures.len(), total);
            for failure in &failures {
                println!("    {}", failure);
            }
        }
    }

    println!();
    println!("══════════════");
    if all_ok {
        println!("✓ All checks passed!");
        ExitCode::SUCCESS
    } else {
        println!("✗ Some tiles are missing or unreadable");
        ExitCode::FAILURE
    }
}

/// Load every tile of a level and collect the failures.
async fn check_level(
    loader: &TileLoader<FsAssetSource>,
    level: ZoomLevel,
    coords: Vec<TileCoord>,
    config: Arc<ZoomConfigurationSet>,
) -> Vec<String> {
    let mut events = loader.load_missing(coords, Arc::clone(&config), Arc::new(TileCache::new()));
    let mut failures = Vec::new();

    while let Some(event) = events.recv().await {
        match event {
            LoadEvent::Loaded { coord, tile } => {
                let expected = config.tile_bounds(coord);
                if tile.size() != expected.size() {
                    debug!(
                        level = %level,
                        tile = %coord,
                        "tile is {}x{}, grid expects {}x{}",
                        tile.width(),
                        tile.height(),
                        expected.width,
                        expected.height
                    );
                }
            }
            LoadEvent::Failed { coord, error } => {
                failures.push(format!("{} {}", coord, error));
            }
        }
    }

    failures.sort();
    failures
}
