//! NBT (Named Binary Tag) structures for Minecraft chunk data.
//!
//! Deserialized with fastnbt from the decompressed chunk payload of a
//! region file. Fields the renderers don't need are ignored.

use serde::{Deserialize, Serialize};

pub const AIR: &str = "minecraft:air";

pub fn is_air(name: &str) -> bool {
    matches!(name, "minecraft:air" | "minecraft:cave_air" | "minecraft:void_air")
}

/// Bits per packed palette index: ceil(log2(palette_len)), min 4.
pub fn bits_per_block(palette_len: usize) -> usize {
    let bits = (palette_len.max(1) as f64).log2().ceil() as usize;
    bits.max(4)
}

/// Main chunk structure - the root of NBT hierarchy in .mca files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkData {
    #[serde(rename = "DataVersion")]
    pub data_version: i32,

    // Chunk coordinates (absolute, not relative to region)
    #[serde(rename = "xPos")]
    pub x_pos: i32,
    #[serde(rename = "zPos")]
    pub z_pos: i32,
    #[serde(rename = "yPos", default)]
    pub y_pos: Option<i32>,

    #[serde(rename = "Status", default)]
    pub status: String,

    // Vertical slices of the chunk (16 blocks high each), ascending by Y
    // once the chunk has been through `sort_sections`
    #[serde(default)]
    pub sections: Vec<Section>,
}

// --- Section (16x16x16 Cube) ---
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "Y")]
    pub y: i8,

    // Optional because empty sections might omit this.
    #[serde(rename = "block_states", alias = "BlockStates", default)]
    pub block_states: Option<BlockStates>,

    #[serde(rename = "biomes", alias = "Biomes", default)]
    pub biomes: Option<Biomes>,
}

// --- Block Palette ---
// Paletted storage: a list of unique blocks plus packed indices into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockStates {
    pub palette: Vec<BlockState>,
    // Absent when the palette has a single entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<fastnbt::LongArray>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Biomes {
    pub palette: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<fastnbt::LongArray>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockState {
    #[serde(rename = "Name")]
    pub name: String,
}

impl BlockStates {
    /// Palette index of the block at section-local coordinates.
    ///
    /// Indices never span two longs (1.16+ layout).
    pub fn palette_index(&self, x: usize, y: usize, z: usize) -> usize {
        if self.palette.len() <= 1 {
            return 0;
        }
        let Some(data) = &self.data else {
            return 0;
        };

        let bits = bits_per_block(self.palette.len());
        let per_long = 64 / bits;
        let i = (y * 16 + z) * 16 + x;
        let long = data.get(i / per_long).copied().unwrap_or(0) as u64;
        let mask = (1u64 << bits) - 1;
        ((long >> ((i % per_long) * bits)) & mask) as usize
    }

    pub fn block_at(&self, x: usize, y: usize, z: usize) -> &str {
        self.palette
            .get(self.palette_index(x, y, z))
            .map(|state| state.name.as_str())
            .unwrap_or(AIR)
    }

    fn is_all_air(&self) -> bool {
        self.palette.iter().all(|state| is_air(&state.name))
    }
}

impl ChunkData {
    /// Order sections bottom to top. Region decoding does this for every chunk.
    pub fn sort_sections(&mut self) {
        self.sections.sort_by_key(|section| section.y);
    }

    /// Highest non-air block in a column, as (world y, block name).
    ///
    /// Expects sections in ascending order, see [`ChunkData::sort_sections`].
    pub fn top_block(&self, x: usize, z: usize) -> Option<(i32, &str)> {
        for section in self.sections.iter().rev() {
            let Some(states) = &section.block_states else {
                continue;
            };
            if states.is_all_air() {
                continue;
            }
            for y in (0..16).rev() {
                let name = states.block_at(x, y, z);
                if !is_air(name) {
                    return Some((section.y as i32 * 16 + y as i32, name));
                }
            }
        }
        None
    }
}
