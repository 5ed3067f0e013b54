use std::path::{Path, PathBuf};
use std::sync::Arc;

use tilemc_anvil::{Region, RegionCoordinate, RegionError};
use tilemc_metrics::ScanMetrics;

use crate::config::WorldConfig;
use crate::pause::PauseSignal;
use crate::renderer::registry::RendererRegistry;
use crate::renderer::{RendererBuilder, RendererInfo};
use crate::source::WorldDataSource;

/// A rendered world: configuration, chunk access and the pause flag.
///
/// Shared read-mostly by every task scanning one of its regions.
pub struct World {
    name: String,
    config: WorldConfig,
    tiles_dir: PathBuf,
    source: Arc<dyn WorldDataSource>,
    registry: Arc<RendererRegistry>,
    renderers: Vec<RendererBuilder>,
    paused: PauseSignal,
    metrics: Arc<ScanMetrics>,
}

impl World {
    /// Resolve the configured renderer keys against the registry.
    ///
    /// Unknown keys are skipped with a warning; repeated keys keep their
    /// first position.
    pub fn new(
        name: impl Into<String>,
        config: WorldConfig,
        tiles_root: &Path,
        source: Arc<dyn WorldDataSource>,
        registry: Arc<RendererRegistry>,
    ) -> Arc<Self> {
        let name = name.into();
        let mut renderers: Vec<RendererBuilder> = Vec::with_capacity(config.render.renderers.len());

        for key in &config.render.renderers {
            if renderers.iter().any(|builder| builder.key() == key.as_str()) {
                log::warn!("[{}] Renderer '{}' is configured more than once", name, key);
                continue;
            }
            match registry.get(key) {
                Some(builder) => renderers.push(builder.clone()),
                None => log::warn!("[{}] Unknown renderer '{}', skipping", name, key),
            }
        }

        Arc::new(Self {
            tiles_dir: tiles_root.join(&name),
            name,
            config,
            source,
            registry,
            renderers,
            paused: PauseSignal::new(),
            metrics: Arc::new(ScanMetrics::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Where this world's tiles are written.
    pub fn tiles_dir(&self) -> &Path {
        &self.tiles_dir
    }

    /// Configured renderer builders, in execution order.
    pub fn renderers(&self) -> &[RendererBuilder] {
        &self.renderers
    }

    pub fn registry(&self) -> &Arc<RendererRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &Arc<ScanMetrics> {
        &self.metrics
    }

    pub fn pause_signal(&self) -> &PauseSignal {
        &self.paused
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused.is_set()
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.set(paused);
    }

    pub fn get_region(&self, coord: RegionCoordinate) -> Result<Region, RegionError> {
        self.source.load_region(coord)
    }

    /// Renderers the web front-end should offer for this world.
    pub fn renderer_listing(&self) -> Vec<RendererInfo> {
        self.renderers.iter().map(RendererBuilder::info).collect()
    }
}
