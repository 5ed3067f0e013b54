use std::fmt;

/// Position of a region on the world grid, in region units.
///
/// One region covers 32x32 chunks (512x512 blocks). Two coordinates are
/// equal when both axes match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCoordinate {
    pub x: i32,
    pub z: i32,
}

impl RegionCoordinate {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Region that contains the given chunk.
    pub const fn from_chunk(chunk_x: i32, chunk_z: i32) -> Self {
        Self::new(chunk_x >> 5, chunk_z >> 5)
    }

    /// Absolute coordinates of the region's first chunk.
    pub const fn chunk_origin(&self) -> (i32, i32) {
        (self.x << 5, self.z << 5)
    }

    /// Absolute coordinates of the region's first block.
    pub const fn block_origin(&self) -> (i32, i32) {
        (self.x << 9, self.z << 9)
    }

    pub fn file_name(&self) -> String {
        format!("r.{}.{}.mca", self.x, self.z)
    }

    /// Parse `r.<x>.<z>.mca`. Anything else is not a region file.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("r.")?.strip_suffix(".mca")?;
        let (x, z) = rest.split_once('.')?;
        Some(Self::new(x.parse().ok()?, z.parse().ok()?))
    }
}

impl fmt::Display for RegionCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}
