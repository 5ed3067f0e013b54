//! Builders that produce chunk NBT and complete region files.
//!
//! Used to create worlds on disk without running a Minecraft server.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};

use crate::header::{ChunkLocation, Header};
use crate::nbt::{self, AIR, Biomes, BlockState, BlockStates, ChunkData, Section};
use crate::region::{COMPRESSION_GZIP, COMPRESSION_ZLIB};
use crate::{CHUNKS_PER_REGION, HEADER_BYTES, RegionCoordinate, SECTOR_BYTES};

/// Data version written into built chunks (1.21.11).
const DATA_VERSION: i32 = 4671;

#[derive(Default)]
pub struct ChunkBuilder {
    // Key: (x, y, z), Value: Block Name
    custom_blocks: HashMap<(u8, i32, u8), String>,
    // Key: y, Value: Block Name
    full_layers: HashMap<i32, String>,
}

impl ChunkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single block at chunk-local coordinates (x: 0..15, z: 0..15)
    pub fn set_block(&mut self, x: u8, y: i32, z: u8, name: &str) -> &mut Self {
        if x < 16 && z < 16 {
            self.custom_blocks.insert((x, y, z), name.to_string());
        }
        self
    }

    /// Fill an entire Y-layer with a block
    pub fn fill_layer(&mut self, y: i32, name: &str) -> &mut Self {
        self.full_layers.insert(y, name.to_string());
        self.custom_blocks.retain(|(_, by, _), _| *by != y);
        self
    }

    pub fn build(&self, chunk_x: i32, chunk_z: i32) -> ChunkData {
        // World height -64 to 320 -> Sections -4 to 19
        let sections = (-4..20).map(|sec_y| self.build_section(sec_y)).collect();

        ChunkData {
            data_version: DATA_VERSION,
            x_pos: chunk_x,
            z_pos: chunk_z,
            y_pos: Some(-4),
            status: "minecraft:full".to_string(),
            sections,
        }
    }

    fn block(&self, x: u8, y: i32, z: u8) -> &str {
        if let Some(name) = self.custom_blocks.get(&(x, y, z)) {
            name.as_str()
        } else if let Some(name) = self.full_layers.get(&y) {
            name.as_str()
        } else {
            AIR
        }
    }

    fn build_section(&self, sec_y: i8) -> Section {
        let start_y = (sec_y as i32) * 16;
        let biomes = Some(Biomes {
            palette: vec!["minecraft:plains".to_string()],
            data: None,
        });

        let mut palette: Vec<String> = Vec::new();
        let mut name_to_index: HashMap<&str, usize> = HashMap::new();
        let mut block_indices = Vec::with_capacity(4096);

        // Index = (y*16 + z)*16 + x
        for y in 0..16 {
            for z in 0..16u8 {
                for x in 0..16u8 {
                    let name = self.block(x, start_y + y, z);
                    let idx = *name_to_index.entry(name).or_insert_with(|| {
                        palette.push(name.to_string());
                        palette.len() - 1
                    });
                    block_indices.push(idx);
                }
            }
        }

        if palette.len() <= 1 {
            let single = palette.pop().unwrap_or_else(|| AIR.to_string());
            return Section {
                y: sec_y,
                block_states: Some(BlockStates {
                    palette: vec![BlockState { name: single }],
                    data: None,
                }),
                biomes,
            };
        }

        let bits = nbt::bits_per_block(palette.len());
        let per_long = 64 / bits;
        let mask = (1u64 << bits) - 1;
        let mut packed = vec![0i64; 4096_usize.div_ceil(per_long)];

        for (i, &block_idx) in block_indices.iter().enumerate() {
            let shift = (i % per_long) * bits;
            let current = packed[i / per_long] as u64;
            packed[i / per_long] = (current | (((block_idx as u64) & mask) << shift)) as i64;
        }

        Section {
            y: sec_y,
            block_states: Some(BlockStates {
                palette: palette.into_iter().map(|name| BlockState { name }).collect(),
                data: Some(fastnbt::LongArray::new(packed)),
            }),
            biomes,
        }
    }
}

/// Assembles a region file from chunk payloads.
#[derive(Default)]
pub struct RegionFileBuilder {
    // Key: chunk index, Value: compression type + payload
    chunks: BTreeMap<usize, (u8, Vec<u8>)>,
}

impl RegionFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a chunk zlib-compressed, the way the game writes it.
    pub fn insert(&mut self, local_x: i32, local_z: i32, chunk: &ChunkData) -> Result<&mut Self> {
        let nbt = fastnbt::to_bytes(chunk).context("Failed to serialize chunk NBT")?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&nbt).context("Failed to compress chunk")?;
        let compressed = encoder.finish().context("Failed to finish compression")?;
        Ok(self.insert_raw(local_x, local_z, COMPRESSION_ZLIB, &compressed))
    }

    pub fn insert_gzip(&mut self, local_x: i32, local_z: i32, chunk: &ChunkData) -> Result<&mut Self> {
        let nbt = fastnbt::to_bytes(chunk).context("Failed to serialize chunk NBT")?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&nbt).context("Failed to compress chunk")?;
        let compressed = encoder.finish().context("Failed to finish compression")?;
        Ok(self.insert_raw(local_x, local_z, COMPRESSION_GZIP, &compressed))
    }

    /// Store an already-encoded payload with an arbitrary compression byte.
    pub fn insert_raw(&mut self, local_x: i32, local_z: i32, compression: u8, payload: &[u8]) -> &mut Self {
        self.chunks
            .insert(Header::chunk_index(local_x, local_z), (compression, payload.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut locations = vec![ChunkLocation::default(); CHUNKS_PER_REGION];
        let mut body = Vec::new();
        // Sector 0-1 are the header itself
        let mut next_sector = (HEADER_BYTES / SECTOR_BYTES) as u32;

        for (&index, (compression, payload)) in &self.chunks {
            let start = body.len();
            body.extend_from_slice(&((payload.len() + 1) as u32).to_be_bytes());
            body.push(*compression);
            body.extend_from_slice(payload);

            let sectors = (body.len() - start).div_ceil(SECTOR_BYTES);
            body.resize(start + sectors * SECTOR_BYTES, 0);

            locations[index] = ChunkLocation {
                sector_offset: next_sector,
                sector_count: sectors.min(u8::MAX as usize) as u8,
            };
            next_sector += sectors as u32;
        }

        let timestamps = vec![0u32; CHUNKS_PER_REGION];
        let mut file = Header::encode(&locations, &timestamps);
        file.extend_from_slice(&body);
        file
    }

    pub fn write_to(&self, dir: &Path, coord: RegionCoordinate) -> Result<PathBuf> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(coord.file_name());
        fs::write(&path, self.build()).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}
