//! Plant simulation components for Plant Architect.
//!
//! This crate provides:
//! - Placement volumes (`Volume` trait, `CubeVolume`)
//! - Constant-rate object rotation
//! - Triangle-level illumination estimation with a pluggable solver
//! - Component save/load
//! - Configuration loading
//! - Gizmo debug overlays

use bevy::prelude::*;

pub mod component_io;
pub mod cube_volume;
pub mod debug_draw;
pub mod illumination;
pub mod object_rotator;
pub mod settings;
pub mod volume;

pub use component_io::{
    component_file_info, load_component, load_component_binary, load_component_json,
    save_component, save_component_binary, save_component_json, ComponentFileInfo,
    ComponentFormat, ComponentIoError, ComponentIoResult,
};
pub use cube_volume::{fit_volumes_to_meshes, Bound, CubeVolume, FitVolumeToMesh};
pub use debug_draw::PlantArchitectGizmosPlugin;
pub use illumination::{
    collect_light_probes, estimate_illumination, process_illumination_requests,
    scatter_vertex_colors, CalculateIllumination, IlluminationError, IlluminationReport,
    IlluminationResult, IlluminationSolver, IlluminationSolverResource, LightProbe,
    MeshGeometry, SkyExposureSolver, TriangleId, TriangleIlluminationEstimator,
};
pub use object_rotator::{rotate_objects, ObjectRotator};
pub use settings::{
    load_config, load_config_or_default, save_config, ConfigError, ConfigResult,
    IlluminationSettings, PlantArchitectConfig,
};
pub use volume::{scatter_points, Volume, VolumeRng};

/// Core plugin: registers components and resources and schedules their systems.
///
/// Resources already present (settings, solver, RNG) are kept, so insert
/// them before adding the plugin to override the defaults.
pub struct PlantArchitectPlugin;

impl Plugin for PlantArchitectPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Bound>()
            .register_type::<CubeVolume>()
            .register_type::<ObjectRotator>()
            .register_type::<TriangleIlluminationEstimator>()
            .register_type::<IlluminationSettings>()
            .init_resource::<IlluminationSettings>()
            .init_resource::<IlluminationSolverResource>()
            .init_resource::<VolumeRng>()
            .add_systems(FixedUpdate, rotate_objects)
            .add_systems(
                Update,
                (fit_volumes_to_meshes, process_illumination_requests),
            );
    }
}
