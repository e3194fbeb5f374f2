//! Constant-rate rotation of an entity.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Spins its entity every fixed tick.
///
/// `rotation` holds Euler rates in degrees per second around X, Y and Z;
/// `rotate_speed` scales all three.
#[derive(Component, Reflect, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[reflect(Component, Default)]
#[serde(default)]
pub struct ObjectRotator {
    pub rotate_speed: f32,
    pub rotation: Vec3,
}

impl Default for ObjectRotator {
    fn default() -> Self {
        Self {
            rotate_speed: 1.0,
            rotation: Vec3::ZERO,
        }
    }
}

impl ObjectRotator {
    pub fn new(rotation: Vec3, rotate_speed: f32) -> Self {
        Self {
            rotate_speed,
            rotation,
        }
    }

    /// Local rotation to apply for a step of `dt` seconds.
    pub fn step(&self, dt: f32) -> Quat {
        let angles = self.rotation * self.rotate_speed * dt;
        Quat::from_euler(
            EulerRot::XYZ,
            angles.x.to_radians(),
            angles.y.to_radians(),
            angles.z.to_radians(),
        )
    }
}

/// Runs in `FixedUpdate`.
pub fn rotate_objects(time: Res<Time>, mut rotators: Query<(&ObjectRotator, &mut Transform)>) {
    let dt = time.delta_secs();
    for (rotator, mut transform) in &mut rotators {
        transform.rotate_local(rotator.step(dt));
    }
}
