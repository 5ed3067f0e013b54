//! Region file header parsing.
//!
//! The header consists of two tables:
//! - Location table: where each chunk is stored
//! - Timestamp table: when each chunk was last saved

use crate::region::RegionError;
use crate::{CHUNKS_PER_REGION, HEADER_BYTES, SECTOR_BYTES};

/// One entry of the location table: 3 bytes offset + 1 byte sector count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkLocation {
    pub sector_offset: u32,
    pub sector_count: u8,
}

impl ChunkLocation {
    /// Offset 0 points into the header itself, so it marks an absent chunk.
    pub fn is_present(&self) -> bool {
        self.sector_offset >= 2 && self.sector_count > 0
    }

    pub fn byte_offset(&self) -> usize {
        self.sector_offset as usize * SECTOR_BYTES
    }
}

/// Parsed MCA file header.
#[derive(Debug, Clone)]
pub struct Header {
    locations: Vec<ChunkLocation>,
    timestamps: Vec<u32>,
}

impl Header {
    pub fn parse(bytes: &[u8]) -> Result<Self, RegionError> {
        if bytes.len() < HEADER_BYTES {
            return Err(RegionError::Truncated(format!(
                "header is {} bytes, expected {}",
                bytes.len(),
                HEADER_BYTES
            )));
        }

        let mut locations = Vec::with_capacity(CHUNKS_PER_REGION);
        let mut timestamps = Vec::with_capacity(CHUNKS_PER_REGION);
        for i in 0..CHUNKS_PER_REGION {
            let entry = &bytes[i * 4..i * 4 + 4];
            locations.push(ChunkLocation {
                sector_offset: u32::from_be_bytes([0, entry[0], entry[1], entry[2]]),
                sector_count: entry[3],
            });

            let stamp = &bytes[4096 + i * 4..4096 + i * 4 + 4];
            timestamps.push(u32::from_be_bytes([stamp[0], stamp[1], stamp[2], stamp[3]]));
        }

        Ok(Self { locations, timestamps })
    }

    /// Encode a complete header (8192 bytes).
    pub fn encode(locations: &[ChunkLocation], timestamps: &[u32]) -> Vec<u8> {
        let mut header = vec![0u8; HEADER_BYTES];

        for (i, location) in locations.iter().take(CHUNKS_PER_REGION).enumerate() {
            let entry_offset = i * 4;
            header[entry_offset] = ((location.sector_offset >> 16) & 0xFF) as u8;
            header[entry_offset + 1] = ((location.sector_offset >> 8) & 0xFF) as u8;
            header[entry_offset + 2] = (location.sector_offset & 0xFF) as u8;
            header[entry_offset + 3] = location.sector_count;
        }

        for (i, stamp) in timestamps.iter().take(CHUNKS_PER_REGION).enumerate() {
            let entry_offset = 4096 + i * 4;
            header[entry_offset..entry_offset + 4].copy_from_slice(&stamp.to_be_bytes());
        }

        header
    }

    pub fn location(&self, index: usize) -> ChunkLocation {
        self.locations.get(index).copied().unwrap_or_default()
    }

    pub fn timestamp(&self, index: usize) -> u32 {
        self.timestamps.get(index).copied().unwrap_or(0)
    }

    /// Table index for region-local chunk coordinates. Formula: x + z * 32
    #[inline]
    pub fn chunk_index(local_x: i32, local_z: i32) -> usize {
        ((local_x & 31) + (local_z & 31) * 32) as usize
    }
}
