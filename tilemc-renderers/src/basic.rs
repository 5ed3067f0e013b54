use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use tilemc_anvil::{REGION_BLOCKS, Region, RegionCoordinate};
use tilemc_render::{Renderer, World};

use crate::tile_path;

pub const KEY: &str = "basic";

const WATER: [u8; 3] = [0x3f, 0x76, 0xe4];

/// Colors each column by its top block, darker the lower it is.
pub struct BasicRenderer {
    world: Arc<World>,
    image: Option<RgbaImage>,
}

impl BasicRenderer {
    pub fn new(world: Arc<World>) -> Self {
        Self { world, image: None }
    }
}

impl Renderer for BasicRenderer {
    fn key(&self) -> &str {
        KEY
    }

    fn name(&self) -> &str {
        "Basic"
    }

    fn allocate_data(&mut self, _region: RegionCoordinate) -> Result<()> {
        self.image = Some(RgbaImage::new(REGION_BLOCKS, REGION_BLOCKS));
        Ok(())
    }

    fn scan_data(&mut self, region: &Region) -> Result<()> {
        let image = self.image.as_mut().context("scan before allocate")?;

        for ((chunk_x, chunk_z), chunk) in region.chunks() {
            for z in 0..16 {
                for x in 0..16 {
                    let Some((y, name)) = chunk.top_block(x, z) else {
                        continue;
                    };
                    let px = chunk_x as u32 * 16 + x as u32;
                    let pz = chunk_z as u32 * 16 + z as u32;
                    image.put_pixel(px, pz, shade(block_color(name), y));
                }
            }
        }
        Ok(())
    }

    fn save_data(&mut self, region: RegionCoordinate) -> Result<()> {
        let image = self.image.as_ref().context("save before allocate")?;
        let path = tile_path(&self.world, KEY, region, "png");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        image
            .save(&path)
            .with_context(|| format!("Failed to write tile {}", path.display()))?;
        log::trace!("[{}] Saved {}", self.world.name(), path.display());
        Ok(())
    }
}

// FNV-1a 64-bit hash
fn fnv1a_hash(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in text.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Stable color per block name.
fn block_color(name: &str) -> [u8; 3] {
    if name == "minecraft:water" {
        return WATER;
    }
    let hash = fnv1a_hash(name);
    // keep channels away from pure black
    [
        0x40 | (hash & 0xBF) as u8,
        0x40 | ((hash >> 8) & 0xBF) as u8,
        0x40 | ((hash >> 16) & 0xBF) as u8,
    ]
}

/// Scale brightness from 60% at the world bottom to 100% at the build limit.
fn shade(rgb: [u8; 3], y: i32) -> Rgba<u8> {
    let height = (y + 64).clamp(0, 384) as u32;
    let factor = 60 + height * 40 / 384;
    let scale = |c: u8| (c as u32 * factor / 100) as u8;
    Rgba([scale(rgb[0]), scale(rgb[1]), scale(rgb[2]), 0xFF])
}
