//! Triangle-level illumination estimation.
//!
//! Every triangle of every mesh under an estimator entity becomes one
//! [`LightProbe`]. The probes are handed to an [`IlluminationSolver`], and the
//! returned energies are averaged back onto the vertices of each mesh.
//!
//! The pass is split into pure functions so it can run without an `App`:
//!
//! - [`collect_light_probes`]: geometry snapshot -> ordered probes and areas
//! - [`estimate_illumination`]: probes -> solver -> [`IlluminationReport`]
//! - [`scatter_vertex_colors`]: per-triangle colors -> per-vertex colors
//!
//! [`TriangleIlluminationEstimator`] wires these into Bevy.
//!
//! # Example
//!
//! ```ignore
//! use architect_core::{CalculateIllumination, TriangleIlluminationEstimator};
//!
//! fn request(mut commands: Commands, plant: Single<Entity, With<TriangleIlluminationEstimator>>) {
//!     commands.entity(*plant).insert(CalculateIllumination::default());
//! }
//! ```

use bevy::prelude::*;

mod estimator;
mod geometry;
mod probe;
mod report;
mod solver;

pub use estimator::{
    collect_subtree, gather_geometry, process_illumination_requests, CalculateIllumination,
    TriangleIlluminationEstimator,
};
pub use geometry::{face_normal, heron_area, triangle_centroid, MeshGeometry, TriangleId};
pub use probe::{collect_light_probes, LightProbe, ProbeSet};
pub use report::{
    energy_to_color, estimate_illumination, radiant_flux, scatter_vertex_colors,
    IlluminationReport, MeshVertexColors, ENERGY_COLOR_EXPONENT,
};
pub use solver::{IlluminationSolver, IlluminationSolverResource, SkyExposureSolver};

/// Errors that can occur during an illumination pass.
#[derive(Debug)]
pub enum IlluminationError {
    /// A mesh could not be turned into triangles.
    InvalidMesh { entity: Entity, reason: String },
    /// The illumination solver reported a failure.
    Solver(String),
}

impl std::fmt::Display for IlluminationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IlluminationError::InvalidMesh { entity, reason } => {
                write!(f, "Invalid mesh on {:?}: {}", entity, reason)
            }
            IlluminationError::Solver(msg) => write!(f, "Solver error: {}", msg),
        }
    }
}

impl std::error::Error for IlluminationError {}

/// Result type for illumination operations.
pub type IlluminationResult<T> = Result<T, IlluminationError>;
