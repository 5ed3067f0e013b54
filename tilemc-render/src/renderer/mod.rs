//! Renderer abstraction.
//!
//! A renderer turns the chunk data of one region into tile output. Each
//! [`RegionScanTask`](crate::RegionScanTask) creates its own instances
//! from the world's [`RendererBuilder`]s and drives them through:
//! 1. `allocate_data` - prepare image buffers, before any chunk data is read
//! 2. `scan_data` - read the loaded region into the buffers
//! 3. `save_data` - persist the buffers

pub mod registry;
pub mod set;

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tilemc_anvil::{Region, RegionCoordinate};

use crate::world::World;

pub trait Renderer: Send {
    /// Unique key within one task. Also the tile subdirectory name.
    fn key(&self) -> &str;

    /// Human readable name listed by the web front-end.
    fn name(&self) -> &str;

    fn allocate_data(&mut self, region: RegionCoordinate) -> Result<()>;

    fn scan_data(&mut self, region: &Region) -> Result<()>;

    fn save_data(&mut self, region: RegionCoordinate) -> Result<()>;
}

/// What a renderer is bound to when it is created.
#[derive(Clone)]
pub struct RenderContext {
    pub world: Arc<World>,
    pub region: RegionCoordinate,
}

type Factory = dyn Fn(&RenderContext) -> Box<dyn Renderer> + Send + Sync;

/// Named factory for one kind of renderer.
#[derive(Clone)]
pub struct RendererBuilder {
    key: String,
    name: String,
    factory: Arc<Factory>,
}

impl RendererBuilder {
    pub fn new<F>(key: impl Into<String>, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&RenderContext) -> Box<dyn Renderer> + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build(&self, context: &RenderContext) -> Box<dyn Renderer> {
        (self.factory)(context)
    }

    pub fn info(&self) -> RendererInfo {
        RendererInfo {
            label: self.key.clone(),
            value: self.name.clone(),
        }
    }
}

impl fmt::Debug for RendererBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererBuilder")
            .field("key", &self.key)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Entry of a world's renderer listing, as the settings exporter writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RendererInfo {
    pub label: String,
    pub value: String,
}
