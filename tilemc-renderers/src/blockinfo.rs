//! Block info tiles for the web front-end's block info panel.
//!
//! One gzip-compressed JSON document per region:
//! `{ "palette": [names], "blocks": [palette index], "heights": [y] }`,
//! both arrays 512x512 in row-major order (z rows, x columns).

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use tilemc_anvil::nbt::AIR;
use tilemc_anvil::{REGION_BLOCKS, Region, RegionCoordinate};
use tilemc_render::{BLOCKINFO, Renderer, World};

use crate::{column_index, tile_path};

/// Height stored for columns without any block.
pub const NO_HEIGHT: i16 = i16::MIN;

#[derive(Debug, Serialize, Deserialize)]
pub struct BlockInfoTile {
    pub palette: Vec<String>,
    pub blocks: Vec<u16>,
    pub heights: Vec<i16>,
}

impl BlockInfoTile {
    fn new() -> Self {
        let columns = (REGION_BLOCKS * REGION_BLOCKS) as usize;
        Self {
            palette: vec![AIR.to_string()],
            blocks: vec![0; columns],
            heights: vec![NO_HEIGHT; columns],
        }
    }
}

pub struct BlockInfoRenderer {
    world: Arc<World>,
    tile: Option<BlockInfoTile>,
    palette_index: HashMap<String, u16>,
}

impl BlockInfoRenderer {
    pub fn new(world: Arc<World>) -> Self {
        Self {
            world,
            tile: None,
            palette_index: HashMap::new(),
        }
    }
}

impl Renderer for BlockInfoRenderer {
    fn key(&self) -> &str {
        BLOCKINFO
    }

    fn name(&self) -> &str {
        "Block Info"
    }

    fn allocate_data(&mut self, _region: RegionCoordinate) -> Result<()> {
        self.tile = Some(BlockInfoTile::new());
        self.palette_index.clear();
        self.palette_index.insert(AIR.to_string(), 0);
        Ok(())
    }

    fn scan_data(&mut self, region: &Region) -> Result<()> {
        let tile = self.tile.as_mut().context("scan before allocate")?;

        for ((chunk_x, chunk_z), chunk) in region.chunks() {
            for z in 0..16 {
                for x in 0..16 {
                    let Some((y, name)) = chunk.top_block(x, z) else {
                        continue;
                    };
                    let id = match self.palette_index.get(name) {
                        Some(&id) => id,
                        None => {
                            let id = u16::try_from(tile.palette.len()).context("block palette overflow")?;
                            tile.palette.push(name.to_string());
                            self.palette_index.insert(name.to_string(), id);
                            id
                        }
                    };
                    let column = column_index(chunk_x, chunk_z, x, z);
                    tile.blocks[column] = id;
                    tile.heights[column] = y.clamp(i16::MIN as i32 + 1, i16::MAX as i32) as i16;
                }
            }
        }
        Ok(())
    }

    fn save_data(&mut self, region: RegionCoordinate) -> Result<()> {
        let tile = self.tile.as_ref().context("save before allocate")?;
        let path = tile_path(&self.world, BLOCKINFO, region, "gz");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, tile).context("Failed to serialize block info")?;
        encoder
            .finish()
            .and_then(|mut writer| writer.flush())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}
