//! Estimation and scatter-back phases.

use bevy::prelude::*;

use super::geometry::{MeshGeometry, TriangleId};
use super::probe::{collect_light_probes, LightProbe, ProbeSet};
use super::solver::IlluminationSolver;
use super::IlluminationResult;
use crate::settings::IlluminationSettings;

/// Exponent applied to probe energy before it becomes a grey level.
pub const ENERGY_COLOR_EXPONENT: f32 = 1.0;

/// Greyscale RGBA color for a probe energy.
pub fn energy_to_color(energy: f32) -> Vec4 {
    let level = energy.powf(ENERGY_COLOR_EXPONENT);
    Vec4::new(level, level, level, 1.0)
}

/// Energy per unit area. Zero when there is no area.
pub fn radiant_flux(total_energy: f32, total_area: f32) -> f32 {
    if total_area > 0.0 {
        total_energy / total_area
    } else {
        0.0
    }
}

/// Averaged vertex colors for one geometry entry.
#[derive(Debug, Clone)]
pub struct MeshVertexColors {
    pub source: Entity,
    pub colors: Vec<Vec4>,
}

/// Everything one estimation pass produced.
///
/// Per-triangle vectors share the collect order and are keyed by `ids`.
#[derive(Debug, Clone)]
pub struct IlluminationReport {
    pub ids: Vec<TriangleId>,
    pub areas: Vec<f32>,
    pub probes: Vec<LightProbe>,
    pub probe_colors: Vec<Vec4>,
    pub total_area: f32,
    pub total_energy: f32,
    pub radiant_flux: f32,
    /// One entry per geometry, in the order the pass received them.
    pub vertex_colors: Vec<MeshVertexColors>,
}

impl IlluminationReport {
    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Probe energy for a triangle, if it took part in the pass.
    pub fn energy_of(&self, id: TriangleId) -> Option<f32> {
        self.ids
            .iter()
            .position(|&probe_id| probe_id == id)
            .map(|i| self.probes[i].energy)
    }
}

/// Run a full pass over `geometry`.
///
/// Returns `Ok(None)` without calling the solver when there are no triangles.
pub fn estimate_illumination(
    geometry: &[MeshGeometry],
    solver: &dyn IlluminationSolver,
    settings: &IlluminationSettings,
) -> IlluminationResult<Option<IlluminationReport>> {
    let ProbeSet {
        ids,
        areas,
        mut probes,
        total_area,
    } = collect_light_probes(geometry);
    if probes.is_empty() {
        return Ok(None);
    }

    solver.estimate(settings, &mut probes)?;

    let total_energy: f32 = probes.iter().map(|probe| probe.energy).sum();
    let probe_colors: Vec<Vec4> = probes
        .iter()
        .map(|probe| energy_to_color(probe.energy))
        .collect();
    let vertex_colors = scatter_vertex_colors(geometry, &ids, &probe_colors);

    Ok(Some(IlluminationReport {
        ids,
        areas,
        probes,
        probe_colors,
        total_area,
        total_energy,
        radiant_flux: radiant_flux(total_energy, total_area),
        vertex_colors,
    }))
}

/// Average per-triangle colors onto the vertices each triangle touches.
///
/// A vertex gets the unweighted mean of its incident triangle colors.
/// Vertices no triangle references keep their existing color.
pub fn scatter_vertex_colors(
    geometry: &[MeshGeometry],
    ids: &[TriangleId],
    colors: &[Vec4],
) -> Vec<MeshVertexColors> {
    let mut accumulators: Vec<Vec<(u32, Vec4)>> = geometry
        .iter()
        .map(|geo| vec![(0, Vec4::ZERO); geo.vertex_count()])
        .collect();

    for (id, color) in ids.iter().zip(colors) {
        let Some(triangle) = geometry
            .get(id.mesh)
            .and_then(|geo| geo.triangles.get(id.triangle))
        else {
            continue;
        };
        let slots = &mut accumulators[id.mesh];
        for vertex in triangle {
            let (count, sum) = &mut slots[*vertex as usize];
            *count += 1;
            *sum += *color;
        }
    }

    geometry
        .iter()
        .zip(accumulators)
        .map(|(geo, slots)| MeshVertexColors {
            source: geo.source,
            colors: slots
                .iter()
                .zip(&geo.colors)
                .map(|(&(count, sum), existing)| {
                    if count == 0 {
                        *existing
                    } else {
                        sum / count as f32
                    }
                })
                .collect(),
        })
        .collect()
}
