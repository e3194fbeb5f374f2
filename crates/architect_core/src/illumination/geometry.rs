//! Mesh snapshots and per-triangle math.

use bevy::math::Affine3A;
use bevy::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};
use bevy::prelude::*;

use super::{IlluminationError, IlluminationResult};

/// Triangle area from its three corners using Heron's formula.
///
/// Rounding can push the radicand slightly below zero for degenerate
/// triangles, so it is clamped to give 0 instead of NaN.
pub fn heron_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    let ab = a.distance(b);
    let bc = b.distance(c);
    let ca = c.distance(a);
    let p = (ab + bc + ca) * 0.5;
    (p * (p - ab) * (p - bc) * (p - ca)).max(0.0).sqrt()
}

/// Arithmetic mean of the three corners.
pub fn triangle_centroid(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (a + b + c) / 3.0
}

/// Unnormalized face normal. Its length is twice the triangle area.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (a - b).cross(b - c)
}

/// Stable key of a triangle within one estimation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriangleId {
    /// Index into the geometry slice the pass was run on.
    pub mesh: usize,
    /// Index of the triangle inside that geometry.
    pub triangle: usize,
}

/// Owned snapshot of a mesh-bearing entity.
///
/// Positions and triangles are in mesh-local space; `world_from_local` is the
/// entity's global transform at the time of the snapshot.
#[derive(Debug, Clone)]
pub struct MeshGeometry {
    pub source: Entity,
    pub world_from_local: Affine3A,
    pub positions: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
    /// Current vertex colors, white when the mesh carries none.
    pub colors: Vec<Vec4>,
}

impl MeshGeometry {
    /// Build a snapshot, rejecting triangles that point past the vertex buffer.
    pub fn new(
        source: Entity,
        world_from_local: Affine3A,
        positions: Vec<Vec3>,
        triangles: Vec<[u32; 3]>,
    ) -> IlluminationResult<Self> {
        let vertex_count = positions.len();
        if let Some(bad) = triangles
            .iter()
            .position(|tri| tri.iter().any(|&i| i as usize >= vertex_count))
        {
            return Err(IlluminationError::InvalidMesh {
                entity: source,
                reason: format!(
                    "triangle {} {:?} indexes past {} vertices",
                    bad, triangles[bad], vertex_count
                ),
            });
        }

        Ok(Self {
            source,
            world_from_local,
            colors: vec![Vec4::ONE; vertex_count],
            positions,
            triangles,
        })
    }

    /// Replace the current vertex colors. Must match the vertex count.
    pub fn with_colors(mut self, colors: Vec<Vec4>) -> IlluminationResult<Self> {
        if colors.len() != self.positions.len() {
            return Err(IlluminationError::InvalidMesh {
                entity: self.source,
                reason: format!(
                    "{} colors for {} vertices",
                    colors.len(),
                    self.positions.len()
                ),
            });
        }
        self.colors = colors;
        Ok(self)
    }

    /// Snapshot a Bevy mesh.
    ///
    /// Returns `Ok(None)` for meshes that are not triangle lists or have no
    /// `Float32x3` position attribute; those entities are skipped.
    pub fn from_mesh(
        source: Entity,
        mesh: &Mesh,
        transform: &GlobalTransform,
    ) -> IlluminationResult<Option<Self>> {
        if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
            return Ok(None);
        }
        let Some(VertexAttributeValues::Float32x3(raw)) = mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            return Ok(None);
        };
        let positions: Vec<Vec3> = raw.iter().map(|p| Vec3::from_array(*p)).collect();

        let triangles = match mesh.indices() {
            Some(Indices::U16(indices)) => group_triangles(indices.iter().map(|&i| i as u32)),
            Some(Indices::U32(indices)) => group_triangles(indices.iter().copied()),
            None => (0..positions.len() as u32 / 3)
                .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
                .collect(),
        };

        let geometry = Self::new(source, transform.affine(), positions, triangles)?;
        match mesh.attribute(Mesh::ATTRIBUTE_COLOR) {
            Some(VertexAttributeValues::Float32x4(colors)) => geometry
                .with_colors(colors.iter().map(|c| Vec4::from_array(*c)).collect())
                .map(Some),
            _ => Ok(Some(geometry)),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Local-space corners of a triangle.
    pub fn corners(&self, triangle: [u32; 3]) -> [Vec3; 3] {
        triangle.map(|i| self.positions[i as usize])
    }
}

// Trailing indices that do not form a full triangle are dropped.
fn group_triangles(indices: impl Iterator<Item = u32>) -> Vec<[u32; 3]> {
    let flat: Vec<u32> = indices.collect();
    flat.chunks_exact(3)
        .map(|chunk| [chunk[0], chunk[1], chunk[2]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::asset::RenderAssetUsages;

    #[test]
    fn test_heron_area_right_triangle() {
        // Legs 3 and 4, hypotenuse 5.
        let area = heron_area(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0));
        assert!((area - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_heron_matches_cross_product_area() {
        let (a, b, c) = (
            Vec3::new(0.3, -1.2, 2.0),
            Vec3::new(1.7, 0.4, -0.5),
            Vec3::new(-0.9, 2.2, 0.1),
        );
        let expected = (b - a).cross(c - a).length() * 0.5;
        assert!((heron_area(a, b, c) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_triangle_has_zero_area() {
        let area = heron_area(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert!(area.abs() < 1e-3);
        assert!(!area.is_nan());
    }

    #[test]
    fn test_face_normal_is_unnormalized() {
        let normal = face_normal(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        assert!((normal.length() - 4.0).abs() < 1e-5);
        assert!(normal.normalize().z.abs() > 0.999);
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let result = MeshGeometry::new(
            Entity::PLACEHOLDER,
            Affine3A::IDENTITY,
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![[0, 1, 3]],
        );
        assert!(matches!(result, Err(IlluminationError::InvalidMesh { .. })));
    }

    #[test]
    fn test_from_mesh_reads_indices_and_colors() {
        let mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(
                Mesh::ATTRIBUTE_POSITION,
                vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
            )
            .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, vec![[0.5, 0.5, 0.5, 1.0]; 4])
            .with_inserted_indices(Indices::U16(vec![0, 1, 2, 1, 3, 2]));

        let geometry =
            MeshGeometry::from_mesh(Entity::PLACEHOLDER, &mesh, &GlobalTransform::IDENTITY)
                .unwrap()
                .unwrap();
        assert_eq!(geometry.triangles, vec![[0, 1, 2], [1, 3, 2]]);
        assert_eq!(geometry.colors[3], Vec4::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn test_from_mesh_without_indices_is_a_triangle_soup() {
        let mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, vec![[0.0, 0.0, 0.0]; 6]);

        let geometry =
            MeshGeometry::from_mesh(Entity::PLACEHOLDER, &mesh, &GlobalTransform::IDENTITY)
                .unwrap()
                .unwrap();
        assert_eq!(geometry.triangles, vec![[0, 1, 2], [3, 4, 5]]);
        assert_eq!(geometry.colors, vec![Vec4::ONE; 6]);
    }

    #[test]
    fn test_from_mesh_skips_line_lists() {
        let mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, vec![[0.0, 0.0, 0.0]; 2]);
        let geometry =
            MeshGeometry::from_mesh(Entity::PLACEHOLDER, &mesh, &GlobalTransform::IDENTITY)
                .unwrap();
        assert!(geometry.is_none());
    }
}
