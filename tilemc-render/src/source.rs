use std::path::{Path, PathBuf};

use tilemc_anvil::region::list_regions;
use tilemc_anvil::{Region, RegionCoordinate, RegionError};

/// Loads the chunk data of a region on demand.
pub trait WorldDataSource: Send + Sync {
    fn load_region(&self, coord: RegionCoordinate) -> Result<Region, RegionError>;
}

/// A world's `region/` directory of `.mca` files.
pub struct AnvilDirectory {
    region_dir: PathBuf,
}

impl AnvilDirectory {
    pub fn new(region_dir: impl Into<PathBuf>) -> Self {
        Self {
            region_dir: region_dir.into(),
        }
    }

    pub fn region_dir(&self) -> &Path {
        &self.region_dir
    }

    /// Regions that have a file on disk.
    pub fn list_regions(&self) -> Result<Vec<RegionCoordinate>, RegionError> {
        list_regions(&self.region_dir)
    }
}

impl WorldDataSource for AnvilDirectory {
    fn load_region(&self, coord: RegionCoordinate) -> Result<Region, RegionError> {
        Region::load(&self.region_dir, coord)
    }
}
