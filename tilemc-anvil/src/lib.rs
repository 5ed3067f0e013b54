//! Anvil world data for the tile renderer.
//!
//! This crate handles:
//! - Region coordinates and `r.<x>.<z>.mca` file naming
//! - Region file header parsing and chunk payload decompression
//! - Chunk NBT structures and column queries
//! - Fixture builders that produce valid region files

pub mod builder;
pub mod coord;
pub mod header;
pub mod nbt;
pub mod region;

pub use coord::RegionCoordinate;
pub use nbt::ChunkData;
pub use region::{Region, RegionError};

pub const SECTOR_BYTES: usize = 4096; // minecraft uses 4096 bytes per sector
pub const HEADER_BYTES: usize = 8192; // location table + timestamp table

/// Chunks along one side of a region.
pub const REGION_CHUNKS: i32 = 32;
pub const CHUNKS_PER_REGION: usize = 1024;
/// Blocks along one side of a region (and pixels along one side of a tile).
pub const REGION_BLOCKS: u32 = 512;
