//! Illumination solver interface.
//!
//! A solver receives the ordered probe list and writes each probe's energy
//! (and optionally its incoming direction) in place. The call is blocking.
//! Ray tracers live outside this crate and plug in through
//! [`IlluminationSolverResource`].

use std::sync::Arc;

use bevy::prelude::*;

use super::probe::LightProbe;
use super::IlluminationResult;
use crate::settings::IlluminationSettings;

/// Fills in probe energies for one estimation pass.
pub trait IlluminationSolver: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Write `energy` for every probe. Must not reorder probes.
    fn estimate(
        &self,
        settings: &IlluminationSettings,
        probes: &mut [LightProbe],
    ) -> IlluminationResult<()>;
}

/// The solver used by [`process_illumination_requests`](super::process_illumination_requests).
#[derive(Resource, Clone)]
pub struct IlluminationSolverResource(pub Arc<dyn IlluminationSolver>);

impl IlluminationSolverResource {
    pub fn new(solver: impl IlluminationSolver + 'static) -> Self {
        Self(Arc::new(solver))
    }
}

impl Default for IlluminationSolverResource {
    fn default() -> Self {
        Self::new(SkyExposureSolver)
    }
}

/// CPU stand-in for a ray tracer: unoccluded uniform sky dome.
///
/// A surface whose world normal is tilted by `theta` from +Y receives `(1 + cos theta) / 2` of the
/// sky's irradiance, scaled by `skylight_power`. No occlusion and no bounces,
/// so sample counts and the bounce limit are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkyExposureSolver;

impl IlluminationSolver for SkyExposureSolver {
    fn name(&self) -> &str {
        "sky-exposure"
    }

    fn estimate(
        &self,
        settings: &IlluminationSettings,
        probes: &mut [LightProbe],
    ) -> IlluminationResult<()> {
        for probe in probes.iter_mut() {
            let up = probe.world_normal.y;
            probe.direction = Vec3::NEG_Y;
            probe.energy = settings.skylight_power * (1.0 + up) * 0.5;
        }
        Ok(())
    }
}
