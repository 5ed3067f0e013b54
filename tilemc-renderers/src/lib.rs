//! Built-in renderers.
//!
//! - `basic`: top-down PNG tile, one pixel per block column
//! - `blockinfo`: gzip JSON with the top block of every column

use std::path::PathBuf;

use tilemc_anvil::RegionCoordinate;
use tilemc_render::{BLOCKINFO, RegistryError, Renderer, RendererBuilder, RendererRegistry, World};

pub mod basic;
pub mod blockinfo;

pub use basic::BasicRenderer;
pub use blockinfo::BlockInfoRenderer;

/// Zoom level the scan writes. Other levels are derived by the front-end.
pub const BASE_ZOOM: u32 = 0;

pub fn register_defaults(registry: &mut RendererRegistry) -> Result<(), RegistryError> {
    registry.register(RendererBuilder::new(basic::KEY, "Basic", |ctx| {
        Box::new(BasicRenderer::new(ctx.world.clone())) as Box<dyn Renderer>
    }))?;
    registry.register(RendererBuilder::new(BLOCKINFO, "Block Info", |ctx| {
        Box::new(BlockInfoRenderer::new(ctx.world.clone())) as Box<dyn Renderer>
    }))?;
    Ok(())
}

/// `<tiles>/<world>/<zoom>/<renderer>/<x>_<z>.<ext>`
pub fn tile_path(world: &World, key: &str, region: RegionCoordinate, extension: &str) -> PathBuf {
    world
        .tiles_dir()
        .join(BASE_ZOOM.to_string())
        .join(key)
        .join(format!("{}_{}.{}", region.x, region.z, extension))
}

/// Index of a block column inside a 512x512 region tile.
#[inline]
pub(crate) fn column_index(chunk_x: i32, chunk_z: i32, x: usize, z: usize) -> usize {
    let px = chunk_x as usize * 16 + x;
    let pz = chunk_z as usize * 16 + z;
    pz * tilemc_anvil::REGION_BLOCKS as usize + px
}
