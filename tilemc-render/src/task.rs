//! Scan task for a single region.
//!
//! The task runs these phases once, in order:
//! 1. allocate - every renderer prepares its buffers
//! 2. load - the world loads the region's chunk data
//! 3. scan - every renderer reads the loaded region
//! 4. save - every renderer persists its tiles
//!
//! The world's pause flag is polled before each phase and before each
//! renderer call. A set flag ends the run quietly. Any failure ends the run
//! too, including a panic inside a renderer or the data source; renderers
//! that already saved keep their output.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use thiserror::Error;
use tilemc_anvil::{Region, RegionCoordinate, RegionError};
use tilemc_metrics::PhaseTiming;

use crate::renderer::registry::BLOCKINFO;
use crate::renderer::set::RendererSet;
use crate::renderer::{RenderContext, Renderer, RendererBuilder};
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Allocate,
    Load,
    Scan,
    Save,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Allocate => "allocate",
            Phase::Load => "load",
            Phase::Scan => "scan",
            Phase::Save => "save",
        })
    }
}

impl From<Phase> for PhaseTiming {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Allocate => PhaseTiming::Allocate,
            Phase::Load => PhaseTiming::Load,
            Phase::Scan => PhaseTiming::Scan,
            Phase::Save => PhaseTiming::Save,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to load region {region}")]
    Load {
        region: RegionCoordinate,
        #[source]
        source: RegionError,
    },
    #[error("renderer '{key}' failed during {phase}")]
    Renderer {
        key: String,
        phase: Phase,
        #[source]
        source: anyhow::Error,
    },
    #[error("renderer '{key}' panicked during {phase}: {message}")]
    RendererPanicked { key: String, phase: Phase, message: String },
    #[error("loading region {region} panicked: {message}")]
    LoadPanicked { region: RegionCoordinate, message: String },
}

/// How a run ended.
#[derive(Debug)]
pub(crate) enum ScanOutcome {
    Completed,
    /// The pause flag was observed set before this phase could finish.
    Paused(Phase),
    Failed(ScanError),
}

// Internal early exit, so phases can use `?`.
enum Stop {
    Paused(Phase),
    Failed(ScanError),
}

pub struct RegionScanTask {
    world: Arc<World>,
    region: RegionCoordinate,
    renderers: RendererSet,
    started: bool,
}

impl RegionScanTask {
    /// Create every renderer for this region up front.
    ///
    /// Order is the world's configured renderers, then the block info
    /// renderer when the world's block info UI is enabled and it is not
    /// configured already.
    pub fn new(world: Arc<World>, region: RegionCoordinate) -> Self {
        let registry = Arc::clone(world.registry());
        let mut builders: Vec<RendererBuilder> = world.renderers().to_vec();

        let configured = builders.iter().any(|builder| builder.key() == BLOCKINFO);
        if world.config().blockinfo_enabled() && !configured {
            match registry.get(BLOCKINFO) {
                Some(builder) => builders.push(builder.clone()),
                None => log::debug!("[{}] Block info enabled but no '{}' renderer is registered", world.name(), BLOCKINFO),
            }
        }

        let context = RenderContext {
            world: Arc::clone(&world),
            region,
        };
        let mut renderers = RendererSet::with_capacity(builders.len());
        for builder in &builders {
            let renderer = registry.create_renderer(&context, builder);
            if let Err(err) = renderers.insert(renderer) {
                log::warn!("[{}] {} for region {}, keeping the first", world.name(), err, region);
            }
        }

        Self {
            world,
            region,
            renderers,
            started: false,
        }
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    pub fn region(&self) -> RegionCoordinate {
        self.region
    }

    pub fn renderer(&self, key: &str) -> Option<&dyn Renderer> {
        self.renderers.get(key)
    }

    pub fn renderer_keys(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys()
    }

    /// Release every renderer and its buffers. Safe to call at any time.
    pub fn cleanup(&mut self) {
        self.renderers.clear();
    }

    /// Run the whole lifecycle once. Failures are logged, never returned.
    pub fn run(&mut self) {
        if self.started {
            log::warn!("[{}] Scan task for {} was already run", self.world.name(), self.region);
            return;
        }
        self.started = true;

        log::debug!(
            "[{}] Scanning {} -- {}",
            self.world.name(),
            self.region,
            thread::current().name().unwrap_or("unnamed")
        );

        let metrics = Arc::clone(self.world.metrics());
        metrics.record_started();

        match self.execute() {
            ScanOutcome::Completed => metrics.record_completed(),
            ScanOutcome::Paused(phase) => {
                log::debug!("[{}] Paused, stopping {} at {}", self.world.name(), self.region, phase);
                metrics.record_paused();
            }
            ScanOutcome::Failed(err) => {
                match &err {
                    ScanError::Load { .. } | ScanError::LoadPanicked { .. } => metrics.record_load_failure(),
                    ScanError::Renderer { .. } | ScanError::RendererPanicked { .. } => {
                        metrics.record_renderer_failure()
                    }
                }
                let err = anyhow::Error::new(err).context(format!("Failed to scan region {}", self.region));
                log::error!("[{}] {:#}", self.world.name(), err);
            }
        }
    }

    pub(crate) fn execute(&mut self) -> ScanOutcome {
        match self.try_execute() {
            Ok(()) => ScanOutcome::Completed,
            Err(Stop::Paused(phase)) => ScanOutcome::Paused(phase),
            Err(Stop::Failed(err)) => ScanOutcome::Failed(err),
        }
    }

    fn try_execute(&mut self) -> Result<(), Stop> {
        let coord = self.region;

        checkpoint(&self.world, Phase::Allocate)?;
        self.drive(Phase::Allocate, |renderer| renderer.allocate_data(coord))?;

        checkpoint(&self.world, Phase::Load)?;
        let region = self.load_region()?;
        self.drive(Phase::Scan, |renderer| renderer.scan_data(&region))?;

        checkpoint(&self.world, Phase::Save)?;
        self.drive(Phase::Save, |renderer| renderer.save_data(coord))
    }

    fn load_region(&self) -> Result<Region, Stop> {
        let started = Instant::now();
        let loaded = panic::catch_unwind(AssertUnwindSafe(|| self.world.get_region(self.region))).map_err(|payload| {
            Stop::Failed(ScanError::LoadPanicked {
                region: self.region,
                message: panic_message(payload.as_ref()),
            })
        })?;
        let region = loaded.map_err(|source| {
            Stop::Failed(ScanError::Load {
                region: self.region,
                source,
            })
        })?;

        let metrics = self.world.metrics();
        metrics.record_phase(PhaseTiming::Load, started.elapsed());
        metrics.record_chunks_loaded(region.chunk_count());
        Ok(region)
    }

    /// Call `step` on every renderer in order, polling the pause flag first.
    fn drive<F>(&mut self, phase: Phase, mut step: F) -> Result<(), Stop>
    where
        F: FnMut(&mut dyn Renderer) -> anyhow::Result<()>,
    {
        let started = Instant::now();
        for (key, renderer) in self.renderers.iter_mut() {
            checkpoint(&self.world, phase)?;
            let result = panic::catch_unwind(AssertUnwindSafe(|| step(renderer.as_mut()))).map_err(|payload| {
                Stop::Failed(ScanError::RendererPanicked {
                    key: key.to_string(),
                    phase,
                    message: panic_message(payload.as_ref()),
                })
            })?;
            result.map_err(|source| {
                Stop::Failed(ScanError::Renderer {
                    key: key.to_string(),
                    phase,
                    source,
                })
            })?;
        }
        self.world.metrics().record_phase(phase.into(), started.elapsed());
        Ok(())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn checkpoint(world: &World, next: Phase) -> Result<(), Stop> {
    if world.is_paused() {
        Err(Stop::Paused(next))
    } else {
        Ok(())
    }
}
