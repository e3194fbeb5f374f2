//! Spatial volumes for procedural placement.
//!
//! A [`Volume`] answers membership queries and produces random sample points.
//! [`CubeVolume`](crate::CubeVolume) is the only concrete shape so far.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Region that supports membership tests and random sampling.
pub trait Volume: Send + Sync {
    /// Uniform random point inside the volume, in local space.
    fn random_point(&self, rng: &mut dyn RngCore) -> Vec3;

    /// Test a world-space point against a volume placed at `transform`.
    fn in_volume_transformed(&self, transform: &GlobalTransform, point: Vec3) -> bool;

    /// Test a local-space point.
    fn in_volume(&self, point: Vec3) -> bool;

    /// Whether placement should treat the volume as blocked space.
    fn is_obstacle(&self) -> bool {
        false
    }
}

/// Shared random source for volume sampling.
#[derive(Resource)]
pub struct VolumeRng(pub StdRng);

impl VolumeRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for VolumeRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

/// Draw `count` random points from `volume` and move them to world space.
pub fn scatter_points(
    volume: &dyn Volume,
    transform: &GlobalTransform,
    rng: &mut dyn RngCore,
    count: usize,
) -> Vec<Vec3> {
    (0..count)
        .map(|_| transform.transform_point(volume.random_point(rng)))
        .collect()
}
