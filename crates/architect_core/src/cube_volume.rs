//! Axis-aligned box volume.

use bevy::mesh::VertexAttributeValues;
use bevy::prelude::*;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::volume::Volume;

/// Axis-aligned bounds in local space. Both corners are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct Bound {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Bound {
    fn default() -> Self {
        Self {
            min: Vec3::splat(-5.0),
            max: Vec3::splat(5.0),
        }
    }
}

impl Bound {
    /// Corners are reordered per axis so `min <= max` always holds.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest bound containing all points, `None` when there are none.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |bound, p| Self {
            min: bound.min.min(p),
            max: bound.max.max(p),
        }))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
        ]
    }

    /// The 12 box edges as corner pairs.
    pub fn edges(&self) -> [(Vec3, Vec3); 12] {
        let c = self.corners();
        [
            (c[0], c[1]),
            (c[1], c[2]),
            (c[2], c[3]),
            (c[3], c[0]),
            (c[4], c[5]),
            (c[5], c[6]),
            (c[6], c[7]),
            (c[7], c[4]),
            (c[0], c[4]),
            (c[1], c[5]),
            (c[2], c[6]),
            (c[3], c[7]),
        ]
    }
}

/// Box-shaped placement volume attached to an entity.
#[derive(Component, Reflect, Clone, Debug, Default, Serialize, Deserialize)]
#[reflect(Component, Default)]
#[serde(default)]
pub struct CubeVolume {
    pub min_max_bound: Bound,
    /// Placement treats this volume as blocked space.
    pub as_obstacle: bool,
    /// Draw the box outline with gizmos.
    pub display_bounds: bool,
    /// Draw a preview of sample points with gizmos.
    pub display_points: bool,
}

impl CubeVolume {
    pub fn new(bound: Bound) -> Self {
        Self {
            min_max_bound: bound,
            ..default()
        }
    }

    /// Fit the bound to a mesh's vertex positions.
    ///
    /// Returns `false` and leaves the bound untouched when there is no mesh or
    /// it has no usable positions.
    pub fn apply_mesh_renderer_bounds(&mut self, mesh: Option<&Mesh>) -> bool {
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.and_then(|mesh| mesh.attribute(Mesh::ATTRIBUTE_POSITION))
        else {
            return false;
        };
        match Bound::from_points(positions.iter().map(|p| Vec3::from_array(*p))) {
            Some(bound) => {
                self.min_max_bound = bound;
                true
            }
            None => false,
        }
    }
}

impl Volume for CubeVolume {
    fn random_point(&self, rng: &mut dyn RngCore) -> Vec3 {
        let Bound { min, max } = Bound::new(self.min_max_bound.min, self.min_max_bound.max);
        Vec3::new(
            rng.gen_range(min.x..=max.x),
            rng.gen_range(min.y..=max.y),
            rng.gen_range(min.z..=max.z),
        )
    }

    fn in_volume_transformed(&self, transform: &GlobalTransform, point: Vec3) -> bool {
        let local = transform.affine().inverse().transform_point3(point);
        self.in_volume(local)
    }

    fn in_volume(&self, point: Vec3) -> bool {
        self.min_max_bound.contains(point)
    }

    fn is_obstacle(&self) -> bool {
        self.as_obstacle
    }
}

/// One-shot request to fit a [`CubeVolume`] to the entity's mesh.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct FitVolumeToMesh;

/// System that handles [`FitVolumeToMesh`] requests.
pub fn fit_volumes_to_meshes(
    mut commands: Commands,
    mut volumes: Query<(Entity, &mut CubeVolume, Option<&Mesh3d>), With<FitVolumeToMesh>>,
    meshes: Res<Assets<Mesh>>,
) {
    for (entity, mut volume, mesh3d) in &mut volumes {
        commands.entity(entity).remove::<FitVolumeToMesh>();

        let mesh = mesh3d.and_then(|handle| meshes.get(&handle.0));
        if volume.apply_mesh_renderer_bounds(mesh) {
            debug!(
                "Fitted volume on {:?} to {:?}..{:?}",
                entity, volume.min_max_bound.min, volume.min_max_bound.max
            );
        } else {
            warn!("Volume on {:?} has no mesh to fit, bound unchanged", entity);
        }
    }
}
