//! Bevy side of the illumination estimator.

use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::geometry::MeshGeometry;
use super::report::{estimate_illumination, IlluminationReport};
use super::solver::IlluminationSolverResource;
use super::IlluminationResult;
use crate::settings::IlluminationSettings;

/// Estimates per-triangle illumination for every mesh under its entity.
///
/// Insert [`CalculateIllumination`] on the same entity to run a pass. The
/// result replaces `last_report`; a pass that finds no triangles leaves it as
/// it was.
#[derive(Component, Reflect, Clone, Debug, Default, Serialize, Deserialize)]
#[reflect(Component, Default)]
pub struct TriangleIlluminationEstimator {
    /// Draw probe normals with gizmos.
    pub display_probes: bool,
    #[reflect(ignore)]
    #[serde(skip)]
    pub last_report: Option<Arc<IlluminationReport>>,
}

impl TriangleIlluminationEstimator {
    pub fn probe_count(&self) -> usize {
        self.last_report
            .as_ref()
            .map_or(0, |report| report.probe_count())
    }

    pub fn total_area(&self) -> f32 {
        self.last_report
            .as_ref()
            .map_or(0.0, |report| report.total_area)
    }

    pub fn total_energy(&self) -> f32 {
        self.last_report
            .as_ref()
            .map_or(0.0, |report| report.total_energy)
    }

    pub fn radiant_flux(&self) -> f32 {
        self.last_report
            .as_ref()
            .map_or(0.0, |report| report.radiant_flux)
    }
}

/// One-shot request for an illumination pass. Removed once processed.
#[derive(Component, Clone, Debug, Default)]
pub struct CalculateIllumination {
    /// Overrides the [`IlluminationSettings`] resource for this pass.
    pub settings: Option<IlluminationSettings>,
}

impl CalculateIllumination {
    pub fn with_settings(settings: IlluminationSettings) -> Self {
        Self {
            settings: Some(settings),
        }
    }
}

/// Append `root` and all of its descendants, pre-order, root first.
pub fn collect_subtree(root: Entity, children: &Query<&Children>, out: &mut Vec<Entity>) {
    out.push(root);
    if let Ok(kids) = children.get(root) {
        for child in kids.iter() {
            collect_subtree(child, children, out);
        }
    }
}

/// Snapshot the meshes of `entities`, keeping their order.
///
/// Entities without a mesh, or whose mesh asset is not loaded, are skipped.
/// The returned handles line up with the geometry.
pub fn gather_geometry(
    entities: &[Entity],
    renderers: &Query<(&Mesh3d, &GlobalTransform)>,
    meshes: &Assets<Mesh>,
) -> IlluminationResult<(Vec<MeshGeometry>, Vec<Handle<Mesh>>)> {
    let mut geometry = Vec::new();
    let mut handles = Vec::new();

    for &entity in entities {
        let Ok((mesh3d, transform)) = renderers.get(entity) else {
            continue;
        };
        let Some(mesh) = meshes.get(&mesh3d.0) else {
            debug!("Mesh for {:?} is not loaded, skipping", entity);
            continue;
        };
        if let Some(geo) = MeshGeometry::from_mesh(entity, mesh, transform)? {
            geometry.push(geo);
            handles.push(mesh3d.0.clone());
        }
    }

    Ok((geometry, handles))
}

/// System that runs pending [`CalculateIllumination`] requests.
///
/// Each pass blocks on the solver and then writes the averaged colors to
/// `Mesh::ATTRIBUTE_COLOR` of every participating mesh.
pub fn process_illumination_requests(
    mut commands: Commands,
    default_settings: Res<IlluminationSettings>,
    solver: Res<IlluminationSolverResource>,
    mut requests: Query<(
        Entity,
        &CalculateIllumination,
        &mut TriangleIlluminationEstimator,
    )>,
    children: Query<&Children>,
    renderers: Query<(&Mesh3d, &GlobalTransform)>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for (owner, request, mut estimator) in &mut requests {
        commands.entity(owner).remove::<CalculateIllumination>();

        let settings = request
            .settings
            .clone()
            .unwrap_or_else(|| IlluminationSettings::clone(&default_settings));

        let mut entities = Vec::new();
        collect_subtree(owner, &children, &mut entities);

        let (geometry, handles) = match gather_geometry(&entities, &renderers, &meshes) {
            Ok(gathered) => gathered,
            Err(e) => {
                warn!("Illumination for {:?} aborted: {}", owner, e);
                continue;
            }
        };

        let report = match estimate_illumination(&geometry, solver.0.as_ref(), &settings) {
            Ok(Some(report)) => report,
            Ok(None) => {
                debug!("No triangles under {:?}, nothing to estimate", owner);
                continue;
            }
            Err(e) => {
                warn!(
                    "Illumination for {:?} failed in solver '{}': {}",
                    owner,
                    solver.0.name(),
                    e
                );
                continue;
            }
        };

        for (mesh_colors, handle) in report.vertex_colors.iter().zip(&handles) {
            if let Some(mesh) = meshes.get_mut(handle) {
                let colors: Vec<[f32; 4]> =
                    mesh_colors.colors.iter().map(|c| c.to_array()).collect();
                mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
            }
        }

        info!(
            "Illumination for {:?}: {} probes over {} meshes, area {:.4}, energy {:.4}, flux {:.4}",
            owner,
            report.probe_count(),
            geometry.len(),
            report.total_area,
            report.total_energy,
            report.radiant_flux
        );
        estimator.last_report = Some(Arc::new(report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn test_collect_subtree_is_preorder() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let a = world.spawn(ChildOf(root)).id();
        let a1 = world.spawn(ChildOf(a)).id();
        let b = world.spawn(ChildOf(root)).id();
        let a2 = world.spawn(ChildOf(a)).id();

        let order = world
            .run_system_once(move |children: Query<&Children>| {
                let mut order = Vec::new();
                collect_subtree(root, &children, &mut order);
                order
            })
            .unwrap();
        assert_eq!(order, vec![root, a, a1, a2, b]);
    }

    #[test]
    fn test_accessors_without_report() {
        let estimator = TriangleIlluminationEstimator::default();
        assert_eq!(estimator.probe_count(), 0);
        assert_eq!(estimator.total_area(), 0.0);
        assert_eq!(estimator.total_energy(), 0.0);
        assert_eq!(estimator.radiant_flux(), 0.0);
    }
}
