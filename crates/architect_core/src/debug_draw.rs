//! Gizmo overlays for volumes and light probes.
//!
//! Needs Bevy's gizmo support, so it lives in its own plugin that headless
//! apps can leave out.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cube_volume::CubeVolume;
use crate::illumination::TriangleIlluminationEstimator;
use crate::volume::scatter_points;

/// Number of preview points drawn for a volume with `display_points`.
const PREVIEW_POINT_COUNT: usize = 64;

/// Fixed so the preview does not flicker between frames.
const PREVIEW_SEED: u64 = 0x5EED;

const PREVIEW_POINT_SIZE: f32 = 0.05;

const PROBE_NORMAL_LENGTH: f32 = 0.1;

/// Plugin that draws debug overlays for volumes and estimators.
pub struct PlantArchitectGizmosPlugin;

impl Plugin for PlantArchitectGizmosPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (draw_cube_volumes, draw_light_probes));
    }
}

fn draw_cube_volumes(mut gizmos: Gizmos, volumes: Query<(&CubeVolume, &GlobalTransform)>) {
    for (volume, transform) in &volumes {
        let color = if volume.as_obstacle {
            Color::srgb(0.9, 0.3, 0.2)
        } else {
            Color::srgb(0.3, 0.9, 0.4)
        };

        if volume.display_bounds {
            for (a, b) in volume.min_max_bound.edges() {
                gizmos.line(transform.transform_point(a), transform.transform_point(b), color);
            }
        }

        if volume.display_points {
            let mut rng = StdRng::seed_from_u64(PREVIEW_SEED);
            for point in scatter_points(volume, transform, &mut rng, PREVIEW_POINT_COUNT) {
                for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
                    let offset = axis * PREVIEW_POINT_SIZE;
                    gizmos.line(point - offset, point + offset, color);
                }
            }
        }
    }
}

fn draw_light_probes(mut gizmos: Gizmos, estimators: Query<&TriangleIlluminationEstimator>) {
    for estimator in &estimators {
        if !estimator.display_probes {
            continue;
        }
        let Some(report) = &estimator.last_report else {
            continue;
        };
        for (probe, color) in report.probes.iter().zip(&report.probe_colors) {
            let tip = probe.position + probe.world_normal * PROBE_NORMAL_LENGTH;
            gizmos.line(
                probe.position,
                tip,
                Color::srgb(color.x.clamp(0.0, 1.0), color.y.clamp(0.0, 1.0), color.z.clamp(0.0, 1.0)),
            );
        }
    }
}
