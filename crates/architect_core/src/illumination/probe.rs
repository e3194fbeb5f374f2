//! Light probes and the collect phase.

use bevy::prelude::*;

use super::geometry::{face_normal, heron_area, triangle_centroid, MeshGeometry, TriangleId};

/// Per-triangle sample handed to the illumination solver.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LightProbe {
    /// World-space triangle centroid.
    pub position: Vec3,
    /// Unnormalized face normal in mesh-local space.
    pub surface_normal: Vec3,
    /// Face normal in world space, normalized. Zero for degenerate triangles.
    pub world_normal: Vec3,
    /// Dominant incoming light direction. Zero until a solver fills it.
    pub direction: Vec3,
    /// Received energy, written by the solver.
    pub energy: f32,
}

impl LightProbe {
    /// Probe for a mesh with no rotation or scale, so both normals agree.
    pub fn new(position: Vec3, surface_normal: Vec3) -> Self {
        Self {
            position,
            surface_normal,
            world_normal: surface_normal.normalize_or_zero(),
            direction: Vec3::ZERO,
            energy: 0.0,
        }
    }

    pub fn with_world_normal(mut self, world_normal: Vec3) -> Self {
        self.world_normal = world_normal.normalize_or_zero();
        self
    }
}

/// Output of the collect phase, one entry per triangle in encounter order.
///
/// `ids`, `areas` and `probes` always have the same length.
#[derive(Debug, Clone, Default)]
pub struct ProbeSet {
    pub ids: Vec<TriangleId>,
    pub areas: Vec<f32>,
    pub probes: Vec<LightProbe>,
    pub total_area: f32,
}

impl ProbeSet {
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

/// Build one probe per triangle, walking `geometry` in order.
///
/// Areas come from local-space edge lengths; probe positions are the local
/// centroids moved into world space. World normals go through the
/// inverse-transpose of the linear part so non-uniform scale keeps them
/// perpendicular to the surface.
pub fn collect_light_probes(geometry: &[MeshGeometry]) -> ProbeSet {
    let capacity = geometry.iter().map(MeshGeometry::triangle_count).sum();
    let mut set = ProbeSet {
        ids: Vec::with_capacity(capacity),
        areas: Vec::with_capacity(capacity),
        probes: Vec::with_capacity(capacity),
        total_area: 0.0,
    };

    for (mesh, geo) in geometry.iter().enumerate() {
        let normal_matrix = geo.world_from_local.matrix3.inverse().transpose();
        for (triangle, &indices) in geo.triangles.iter().enumerate() {
            let [a, b, c] = geo.corners(indices);
            let area = heron_area(a, b, c);
            let position = geo
                .world_from_local
                .transform_point3(triangle_centroid(a, b, c));

            let normal = face_normal(a, b, c);

            set.ids.push(TriangleId { mesh, triangle });
            set.areas.push(area);
            set.probes.push(
                LightProbe::new(position, normal).with_world_normal(normal_matrix.mul_vec3(normal)),
            );
            set.total_area += area;
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Affine3A;
    use std::f32::consts::PI;

    fn quad(world_from_local: Affine3A) -> MeshGeometry {
        MeshGeometry::new(
            Entity::PLACEHOLDER,
            world_from_local,
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 2.0),
                Vec3::new(2.0, 0.0, 2.0),
            ],
            vec![[0, 2, 1], [1, 2, 3]],
        )
        .unwrap()
    }

    #[test]
    fn test_one_probe_per_triangle_in_order() {
        let single = MeshGeometry::new(
            Entity::PLACEHOLDER,
            Affine3A::IDENTITY,
            vec![Vec3::ZERO, Vec3::X, Vec3::Z],
            vec![[0, 2, 1]],
        )
        .unwrap();
        let set = collect_light_probes(&[quad(Affine3A::IDENTITY), single]);

        assert_eq!(set.len(), 3);
        assert_eq!(set.areas.len(), 3);
        assert_eq!(set.ids.len(), 3);
        assert_eq!(
            set.ids,
            vec![
                TriangleId { mesh: 0, triangle: 0 },
                TriangleId { mesh: 0, triangle: 1 },
                TriangleId { mesh: 1, triangle: 0 },
            ]
        );
    }

    #[test]
    fn test_total_area_is_sum_of_areas() {
        let set = collect_light_probes(&[quad(Affine3A::IDENTITY), quad(Affine3A::IDENTITY)]);
        let sum: f32 = set.areas.iter().sum();
        assert!((set.total_area - sum).abs() < 1e-5);
        assert!((set.total_area - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_probe_positions_are_world_space() {
        let offset = Vec3::new(10.0, 5.0, -3.0);
        let set = collect_light_probes(&[quad(Affine3A::from_translation(offset))]);

        let local = triangle_centroid(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 0.0),
        );
        assert!(set.probes[0].position.distance(local + offset) < 1e-5);
    }

    #[test]
    fn test_areas_ignore_world_scale() {
        let set = collect_light_probes(&[quad(Affine3A::from_scale(Vec3::splat(3.0)))]);
        assert!((set.total_area - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_probes_start_without_energy() {
        let set = collect_light_probes(&[quad(Affine3A::IDENTITY)]);
        for probe in &set.probes {
            assert_eq!(probe.energy, 0.0);
            assert_eq!(probe.direction, Vec3::ZERO);
            assert!(probe.surface_normal.length() > 0.0);
        }
    }

    #[test]
    fn test_world_normal_follows_rotation() {
        // quad() faces the sky locally; half a turn about X puts it upside down.
        let set = collect_light_probes(&[quad(Affine3A::from_rotation_x(PI))]);
        for probe in &set.probes {
            assert!(probe.surface_normal.normalize().y > 0.999);
            assert!(probe.world_normal.y < -0.999);
        }
    }

    #[test]
    fn test_world_normal_survives_non_uniform_scale() {
        let stretched = Affine3A::from_scale(Vec3::new(4.0, 1.0, 1.0)) * Affine3A::from_rotation_z(0.5);
        let geo = MeshGeometry::new(
            Entity::PLACEHOLDER,
            stretched,
            vec![Vec3::ZERO, Vec3::X, Vec3::Z],
            vec![[0, 2, 1]],
        )
        .unwrap();
        let set = collect_light_probes(&[geo]);

        let world_edge_x = stretched.transform_vector3(Vec3::X);
        let world_edge_z = stretched.transform_vector3(Vec3::Z);
        let normal = set.probes[0].world_normal;
        assert!((normal.length() - 1.0).abs() < 1e-4);
        assert!(normal.dot(world_edge_x).abs() < 1e-4);
        assert!(normal.dot(world_edge_z).abs() < 1e-4);
    }

    #[test]
    fn test_empty_geometry() {
        let set = collect_light_probes(&[]);
        assert!(set.is_empty());
        assert_eq!(set.total_area, 0.0);
    }
}
