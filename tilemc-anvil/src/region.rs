//! Region file decoding.
//!
//! A region file holds up to 32x32 chunks. Each present chunk is stored at
//! `sector_offset * 4096` as `[length:4][compression:1][data:length-1]`.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use flate2::read::{GzDecoder, ZlibDecoder};
use thiserror::Error;

use crate::header::{ChunkLocation, Header};
use crate::nbt::ChunkData;
use crate::{CHUNKS_PER_REGION, RegionCoordinate};

pub const COMPRESSION_GZIP: u8 = 1;
pub const COMPRESSION_ZLIB: u8 = 2;
pub const COMPRESSION_NONE: u8 = 3;

#[derive(Debug, Error)]
pub enum RegionError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("region data is truncated: {0}")]
    Truncated(String),
    #[error("chunk {index} uses unsupported compression type {kind}")]
    UnsupportedCompression { index: usize, kind: u8 },
    #[error("chunk {index} could not be decompressed")]
    Decompress {
        index: usize,
        #[source]
        source: io::Error,
    },
    #[error("chunk {index} has malformed NBT")]
    Nbt {
        index: usize,
        #[source]
        source: fastnbt::error::Error,
    },
}

/// Loaded chunk data for one region.
#[derive(Debug, Clone)]
pub struct Region {
    coord: RegionCoordinate,
    chunks: Vec<Option<ChunkData>>,
}

impl Region {
    /// A region with no generated chunks.
    pub fn empty(coord: RegionCoordinate) -> Self {
        Self {
            coord,
            chunks: vec![None; CHUNKS_PER_REGION],
        }
    }

    /// Read `r.<x>.<z>.mca` from `dir` and decode every present chunk.
    pub fn load(dir: &Path, coord: RegionCoordinate) -> Result<Self, RegionError> {
        let path = dir.join(coord.file_name());
        let bytes = fs::read(&path).map_err(|source| RegionError::Io { path, source })?;
        Self::decode(coord, &bytes)
    }

    pub fn decode(coord: RegionCoordinate, bytes: &[u8]) -> Result<Self, RegionError> {
        let header = Header::parse(bytes)?;
        let mut region = Self::empty(coord);

        for index in 0..CHUNKS_PER_REGION {
            let location = header.location(index);
            if !location.is_present() {
                continue;
            }
            region.chunks[index] = Some(read_chunk(bytes, index, location)?);
        }

        log::trace!("Decoded region {} with {} chunks", coord, region.chunk_count());
        Ok(region)
    }

    pub fn coord(&self) -> RegionCoordinate {
        self.coord
    }

    /// Chunk at region-local coordinates (0..32).
    pub fn chunk(&self, local_x: i32, local_z: i32) -> Option<&ChunkData> {
        self.chunks
            .get(Header::chunk_index(local_x, local_z))
            .and_then(Option::as_ref)
    }

    /// Present chunks with their region-local coordinates.
    pub fn chunks(&self) -> impl Iterator<Item = ((i32, i32), &ChunkData)> {
        self.chunks.iter().enumerate().filter_map(|(index, chunk)| {
            let chunk = chunk.as_ref()?;
            Some((((index % 32) as i32, (index / 32) as i32), chunk))
        })
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.iter().filter(|chunk| chunk.is_some()).count()
    }
}

fn read_chunk(bytes: &[u8], index: usize, location: ChunkLocation) -> Result<ChunkData, RegionError> {
    let start = location.byte_offset();
    let prefix = bytes
        .get(start..start + 5)
        .ok_or_else(|| RegionError::Truncated(format!("chunk {index} starts past end of file")))?;

    let length = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
    if length == 0 {
        return Err(RegionError::Truncated(format!("chunk {index} has zero length")));
    }
    let kind = prefix[4];

    // length includes the compression byte
    let payload = bytes
        .get(start + 5..start + 4 + length)
        .ok_or_else(|| RegionError::Truncated(format!("chunk {index} payload runs past end of file")))?;

    let raw = decompress(index, kind, payload)?;
    let mut chunk: ChunkData = fastnbt::from_bytes(&raw).map_err(|source| RegionError::Nbt { index, source })?;
    chunk.sort_sections();
    Ok(chunk)
}

fn decompress(index: usize, kind: u8, payload: &[u8]) -> Result<Vec<u8>, RegionError> {
    let mut out = Vec::new();
    let result = match kind {
        COMPRESSION_GZIP => GzDecoder::new(payload).read_to_end(&mut out),
        COMPRESSION_ZLIB => ZlibDecoder::new(payload).read_to_end(&mut out),
        COMPRESSION_NONE => return Ok(payload.to_vec()),
        other => return Err(RegionError::UnsupportedCompression { index, kind: other }),
    };
    result.map_err(|source| RegionError::Decompress { index, source })?;
    Ok(out)
}

/// Coordinates of every region file in `dir`, sorted.
pub fn list_regions(dir: &Path) -> Result<Vec<RegionCoordinate>, RegionError> {
    let entries = fs::read_dir(dir).map_err(|source| RegionError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut coords = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| RegionError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if let Some(coord) = entry.file_name().to_str().and_then(RegionCoordinate::from_file_name) {
            coords.push(coord);
        }
    }
    coords.sort();
    Ok(coords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ChunkBuilder, RegionFileBuilder};
    use crate::HEADER_BYTES;

    fn stone_chunk(x: i32, z: i32) -> ChunkData {
        let mut builder = ChunkBuilder::new();
        builder.fill_layer(-64, "minecraft:bedrock");
        builder.fill_layer(10, "minecraft:stone");
        builder.build(x, z)
    }

    #[test]
    fn test_decode_present_and_absent_chunks() {
        let mut file = RegionFileBuilder::new();
        file.insert(0, 0, &stone_chunk(0, 0)).unwrap();
        file.insert(31, 2, &stone_chunk(31, 2)).unwrap();

        let region = Region::decode(RegionCoordinate::new(0, 0), &file.build()).unwrap();
        assert_eq!(region.chunk_count(), 2);
        assert!(region.chunk(1, 0).is_none());

        let chunk = region.chunk(31, 2).unwrap();
        assert_eq!((chunk.x_pos, chunk.z_pos), (31, 2));
        assert_eq!(chunk.top_block(4, 4), Some((10, "minecraft:stone")));

        let locals: Vec<_> = region.chunks().map(|(pos, _)| pos).collect();
        assert_eq!(locals, vec![(0, 0), (31, 2)]);
    }

    #[test]
    fn test_gzip_and_uncompressed_payloads() {
        let nbt = fastnbt::to_bytes(&stone_chunk(1, 1)).unwrap();
        let mut file = RegionFileBuilder::new();
        file.insert_raw(1, 1, COMPRESSION_NONE, &nbt);
        file.insert_gzip(2, 1, &stone_chunk(2, 1)).unwrap();

        let region = Region::decode(RegionCoordinate::new(0, 0), &file.build()).unwrap();
        assert_eq!(region.chunk(1, 1).unwrap().x_pos, 1);
        assert_eq!(region.chunk(2, 1).unwrap().x_pos, 2);
    }

    #[test]
    fn test_sections_are_sorted_on_decode() {
        let mut chunk = stone_chunk(0, 0);
        chunk.sections.reverse();
        let mut file = RegionFileBuilder::new();
        file.insert(0, 0, &chunk).unwrap();

        let region = Region::decode(RegionCoordinate::new(0, 0), &file.build()).unwrap();
        let decoded = region.chunk(0, 0).unwrap();
        assert!(decoded.sections.windows(2).all(|pair| pair[0].y < pair[1].y));
        assert_eq!(decoded.top_block(0, 0), Some((10, "minecraft:stone")));
    }

    #[test]
    fn test_unsupported_compression() {
        let mut file = RegionFileBuilder::new();
        file.insert_raw(0, 0, 4, &[1, 2, 3]);
        let err = Region::decode(RegionCoordinate::new(0, 0), &file.build()).unwrap_err();
        assert!(matches!(err, RegionError::UnsupportedCompression { index: 0, kind: 4 }));
    }

    #[test]
    fn test_truncated_payload() {
        let mut file = RegionFileBuilder::new();
        file.insert(0, 0, &stone_chunk(0, 0)).unwrap();
        let bytes = file.build();
        let err = Region::decode(RegionCoordinate::new(0, 0), &bytes[..HEADER_BYTES + 10]).unwrap_err();
        assert!(matches!(err, RegionError::Truncated(_)));
    }

    #[test]
    fn test_corrupt_zlib_payload() {
        let mut file = RegionFileBuilder::new();
        file.insert_raw(0, 0, COMPRESSION_ZLIB, &[0xde, 0xad, 0xbe, 0xef]);
        let err = Region::decode(RegionCoordinate::new(0, 0), &file.build()).unwrap_err();
        assert!(matches!(err, RegionError::Decompress { index: 0, .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Region::load(dir.path(), RegionCoordinate::new(5, 5)).unwrap_err();
        match err {
            RegionError::Io { path, source } => {
                assert!(path.ends_with("r.5.5.mca"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_and_list_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RegionFileBuilder::new();
        file.insert(0, 0, &stone_chunk(-32, 64)).unwrap();
        file.write_to(dir.path(), RegionCoordinate::new(-1, 2)).unwrap();
        RegionFileBuilder::new().write_to(dir.path(), RegionCoordinate::new(-3, 0)).unwrap();
        fs::write(dir.path().join("notes.txt"), b"hi").unwrap();

        assert_eq!(
            list_regions(dir.path()).unwrap(),
            vec![RegionCoordinate::new(-3, 0), RegionCoordinate::new(-1, 2)]
        );

        let region = Region::load(dir.path(), RegionCoordinate::new(-1, 2)).unwrap();
        assert_eq!(region.coord(), RegionCoordinate::new(-1, 2));
        assert_eq!(region.chunk_count(), 1);
    }
}
