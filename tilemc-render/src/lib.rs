//! Per-region world-to-tile rendering.
//!
//! A [`RegionScanTask`] drives every renderer configured for a [`World`]
//! through allocate, scan and save for one region, polling the world's
//! pause flag between every step.

pub mod config;
pub mod pause;
pub mod renderer;
pub mod source;
pub mod task;
pub mod world;

pub use config::WorldConfig;
pub use pause::PauseSignal;
pub use renderer::registry::{BLOCKINFO, RegistryError, RendererRegistry};
pub use renderer::set::{RendererSet, SetError};
pub use renderer::{RenderContext, Renderer, RendererBuilder, RendererInfo};
pub use source::{AnvilDirectory, WorldDataSource};
pub use task::{Phase, RegionScanTask, ScanError};
pub use world::World;

pub use tilemc_anvil::{Region, RegionCoordinate, RegionError};
pub use tilemc_metrics::ScanMetrics;
