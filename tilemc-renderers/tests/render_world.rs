//! Renders regions from a region directory on disk with the built-in renderers.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use flate2::read::GzDecoder;
use tilemc_anvil::builder::{ChunkBuilder, RegionFileBuilder};
use tilemc_render::{AnvilDirectory, BLOCKINFO, RegionCoordinate, RegionScanTask, RendererRegistry, World, WorldConfig};
use tilemc_renderers::blockinfo::{BlockInfoTile, NO_HEIGHT};
use tilemc_renderers::{basic, register_defaults, tile_path};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn world(root: &Path, blockinfo: &str) -> Arc<World> {
    let mut registry = RendererRegistry::new();
    register_defaults(&mut registry).unwrap();

    let mut config = WorldConfig::default();
    config.ui.blockinfo = blockinfo.to_string();

    World::new(
        "overworld",
        config,
        &root.join("tiles"),
        Arc::new(AnvilDirectory::new(root.join("world/region"))),
        Arc::new(registry),
    )
}

fn write_region(root: &Path, coord: RegionCoordinate) {
    let mut chunk = ChunkBuilder::new();
    chunk
        .fill_layer(-64, "minecraft:bedrock")
        .fill_layer(62, "minecraft:grass_block")
        .set_block(5, 80, 7, "minecraft:oak_leaves");

    let (origin_x, origin_z) = coord.chunk_origin();
    let mut file = RegionFileBuilder::new();
    file.insert(0, 0, &chunk.build(origin_x, origin_z))
        .unwrap()
        .insert_gzip(1, 0, &chunk.build(origin_x + 1, origin_z))
        .unwrap();
    file.write_to(&root.join("world/region"), coord).unwrap();
}

#[test]
fn test_renders_tiles_for_region() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let coord = RegionCoordinate::new(1, -1);
    write_region(dir.path(), coord);

    let world = world(dir.path(), "enabled");
    let mut task = RegionScanTask::new(Arc::clone(&world), coord);
    assert_eq!(task.renderer_keys().collect::<Vec<_>>(), vec![basic::KEY, BLOCKINFO]);
    task.run();
    task.cleanup();

    let metrics = world.metrics();
    assert_eq!(metrics.tasks_completed.load(Ordering::Relaxed), 1);
    assert_eq!(metrics.chunks_loaded.load(Ordering::Relaxed), 2);

    let png = tile_path(&world, basic::KEY, coord, "png");
    assert!(png.ends_with("overworld/0/basic/1_-1.png"));
    let image = image::open(&png).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (512, 512));
    assert_eq!(image.get_pixel(0, 0)[3], 0xFF);
    assert_eq!(image.get_pixel(16 + 5, 7)[3], 0xFF);
    assert_ne!(image.get_pixel(5, 7), image.get_pixel(4, 7));
    // chunk (2, 0) was never generated
    assert_eq!(image.get_pixel(40, 0)[3], 0);

    let gz = tile_path(&world, BLOCKINFO, coord, "gz");
    let tile: BlockInfoTile = serde_json::from_reader(GzDecoder::new(File::open(gz).unwrap())).unwrap();
    assert!(tile.palette.iter().any(|name| name == "minecraft:oak_leaves"));
    let grass = tile.palette.iter().position(|name| name == "minecraft:grass_block").unwrap();
    assert_eq!(tile.blocks[0] as usize, grass);
    assert_eq!(tile.heights[0], 62);
    assert_eq!(tile.heights[7 * 512 + 16 + 5], 80);
    assert_eq!(tile.heights[40], NO_HEIGHT);
}

#[test]
fn test_blockinfo_disabled_writes_png_only() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let coord = RegionCoordinate::new(0, 0);
    write_region(dir.path(), coord);

    let world = world(dir.path(), "");
    RegionScanTask::new(Arc::clone(&world), coord).run();

    assert!(tile_path(&world, basic::KEY, coord, "png").exists());
    assert!(!tile_path(&world, BLOCKINFO, coord, "gz").exists());
}

#[test]
fn test_missing_region_writes_nothing() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let coord = RegionCoordinate::new(3, 3);

    let world = world(dir.path(), "enabled");
    RegionScanTask::new(Arc::clone(&world), coord).run();

    assert!(!tile_path(&world, basic::KEY, coord, "png").exists());
    assert!(!tile_path(&world, BLOCKINFO, coord, "gz").exists());
    let metrics = world.metrics();
    assert_eq!(metrics.load_failures.load(Ordering::Relaxed), 1);
    assert_eq!(metrics.tasks_completed.load(Ordering::Relaxed), 0);
}

#[test]
fn test_paused_world_writes_nothing() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let coord = RegionCoordinate::new(0, 0);
    write_region(dir.path(), coord);

    let world = world(dir.path(), "enabled");
    world.set_paused(true);
    RegionScanTask::new(Arc::clone(&world), coord).run();

    assert!(!world.tiles_dir().exists());
    assert_eq!(world.metrics().tasks_paused.load(Ordering::Relaxed), 1);
}
