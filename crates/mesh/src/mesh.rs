//! The sculptable mesh value type.
//!
//! Topology (faces, adjacency) is built once at construction and never
//! changes afterwards; deformation only rewrites vertex positions. The
//! host-integration layer is the only place that touches a real scene
//! graph — everything in this crate operates on the owned value.

use glam::Vec3;

/// Errors that can occur when constructing a mesh.
///
/// Construction is the one fatal boundary: a session cannot begin on a
/// mesh whose base topology cannot be read. Everything downstream
/// degrades per tick instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("Mesh has no vertices")]
    NoVertices,
    #[error("Mesh has no faces")]
    NoFaces,
    #[error("Face {face} references vertex {index} out of range ({count} vertices)")]
    IndexOutOfRange { face: usize, index: u32, count: usize },
    #[error("Vertex {0} has a non-finite position")]
    NonFinitePosition(usize),
}

/// A triangle mesh with fixed topology and mutable vertex positions.
#[derive(Debug, Clone)]
pub struct SculptMesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
    /// Topological one-ring neighbors per vertex, built once.
    neighbors: Vec<Vec<u32>>,
}

impl SculptMesh {
    /// Build a mesh from raw positions and triangle indices.
    ///
    /// Validates topology up front; an invalid base mesh is the only
    /// fatal fault in the engine.
    pub fn from_parts(positions: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        if positions.is_empty() {
            return Err(MeshError::NoVertices);
        }
        if faces.is_empty() {
            return Err(MeshError::NoFaces);
        }
        for (i, p) in positions.iter().enumerate() {
            if !p.is_finite() {
                return Err(MeshError::NonFinitePosition(i));
            }
        }
        let count = positions.len();
        for (fi, face) in faces.iter().enumerate() {
            for &idx in face {
                if idx as usize >= count {
                    return Err(MeshError::IndexOutOfRange { face: fi, index: idx, count });
                }
            }
        }

        let neighbors = build_adjacency(count, &faces);
        let mut mesh = Self {
            positions,
            normals: vec![Vec3::ZERO; count],
            faces,
            neighbors,
        };
        mesh.recompute_normals();
        Ok(mesh)
    }

    /// A unit cube centered at the origin (8 vertices, 12 triangles),
    /// wound counter-clockwise viewed from outside.
    ///
    /// Used as the default spawned primitive and as a test fixture.
    pub fn unit_cube() -> Self {
        let h = 0.5;
        let positions = vec![
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [2, 3, 7],
            [2, 7, 6],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        Self::from_parts(positions, faces).expect("unit cube is a valid mesh")
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn position(&self, index: u32) -> Vec3 {
        self.positions[index as usize]
    }

    pub fn set_position(&mut self, index: u32, position: Vec3) {
        self.positions[index as usize] = position;
    }

    /// Replace all vertex positions verbatim (undo restore).
    ///
    /// The caller guarantees the slice came from the same topology;
    /// a length mismatch is a logic error upstream.
    pub fn restore_positions(&mut self, positions: &[Vec3]) {
        debug_assert_eq!(positions.len(), self.positions.len());
        self.positions.copy_from_slice(positions);
        self.recompute_normals();
    }

    pub fn normal(&self, index: u32) -> Vec3 {
        self.normals[index as usize]
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Topological one-ring neighbors of a vertex.
    pub fn neighbors(&self, index: u32) -> &[u32] {
        &self.neighbors[index as usize]
    }

    /// Recompute per-vertex normals as area-weighted face normal sums.
    ///
    /// Call after any batch of position writes; face cross products give
    /// area weighting for free.
    pub fn recompute_normals(&mut self) {
        self.normals.fill(Vec3::ZERO);
        for face in &self.faces {
            let a = self.positions[face[0] as usize];
            let b = self.positions[face[1] as usize];
            let c = self.positions[face[2] as usize];
            let face_normal = (b - a).cross(c - a);
            for &idx in face {
                self.normals[idx as usize] += face_normal;
            }
        }
        for n in &mut self.normals {
            *n = n.normalize_or_zero();
        }
    }

    /// Signed volume via the tetrahedron sum over faces.
    ///
    /// Correct for closed CCW-wound surfaces; non-manifold edges simply
    /// contribute whatever their faces sum to rather than failing.
    pub fn signed_volume(&self) -> f32 {
        let mut six_v = 0.0;
        for face in &self.faces {
            let a = self.positions[face[0] as usize];
            let b = self.positions[face[1] as usize];
            let c = self.positions[face[2] as usize];
            six_v += a.dot(b.cross(c));
        }
        six_v / 6.0
    }

    /// Average of all vertex positions.
    pub fn centroid(&self) -> Vec3 {
        let sum: Vec3 = self.positions.iter().copied().sum();
        sum / self.positions.len() as f32
    }

    /// Uniformly scale every vertex about a center point.
    pub fn scale_about(&mut self, center: Vec3, factor: f32) {
        for p in &mut self.positions {
            *p = center + (*p - center) * factor;
        }
    }

    /// Axis-aligned bounds of the current vertex positions.
    pub fn bounds(&self) -> crate::spatial::Aabb {
        let mut bounds = crate::spatial::Aabb::empty();
        for &p in &self.positions {
            bounds.include_point(p);
        }
        bounds
    }
}

/// Build the one-ring adjacency lists from the face list.
fn build_adjacency(vertex_count: usize, faces: &[[u32; 3]]) -> Vec<Vec<u32>> {
    let mut neighbors: Vec<Vec<u32>> = vec![Vec::new(); vertex_count];
    for face in faces {
        for i in 0..3 {
            let a = face[i];
            let b = face[(i + 1) % 3];
            if !neighbors[a as usize].contains(&b) {
                neighbors[a as usize].push(b);
            }
            if !neighbors[b as usize].contains(&a) {
                neighbors[b as usize].push(a);
            }
        }
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_cube_volume() {
        let cube = SculptMesh::unit_cube();
        assert!((cube.signed_volume() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_unit_cube_centroid() {
        let cube = SculptMesh::unit_cube();
        assert!(cube.centroid().length() < 1e-6);
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let cube = SculptMesh::unit_cube();
        for i in 0..cube.vertex_count() as u32 {
            // For a cube centered at the origin each vertex normal should
            // point away from the center.
            assert!(cube.normal(i).dot(cube.position(i)) > 0.0);
        }
    }

    #[test]
    fn test_adjacency_cube_corner() {
        let cube = SculptMesh::unit_cube();
        // Every cube corner touches at least its 3 edge-connected corners;
        // triangulation diagonals add more.
        for i in 0..8 {
            assert!(cube.neighbors(i).len() >= 3);
        }
    }

    #[test]
    fn test_scale_about_centroid_scales_volume() {
        let mut cube = SculptMesh::unit_cube();
        cube.scale_about(cube.centroid(), 2.0);
        assert!((cube.signed_volume() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_restore_positions_roundtrip() {
        let mut cube = SculptMesh::unit_cube();
        let saved: Vec<Vec3> = cube.positions().to_vec();
        cube.set_position(0, Vec3::splat(5.0));
        cube.restore_positions(&saved);
        assert_eq!(cube.position(0), Vec3::new(-0.5, -0.5, -0.5));
    }

    #[test]
    fn test_empty_mesh_rejected() {
        assert!(matches!(
            SculptMesh::from_parts(Vec::new(), vec![[0, 1, 2]]),
            Err(MeshError::NoVertices)
        ));
        assert!(matches!(
            SculptMesh::from_parts(vec![Vec3::ZERO], Vec::new()),
            Err(MeshError::NoFaces)
        ));
    }

    #[test]
    fn test_out_of_range_index_rejected() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let result = SculptMesh::from_parts(positions, vec![[0, 1, 7]]);
        assert!(matches!(result, Err(MeshError::IndexOutOfRange { index: 7, .. })));
    }

    #[test]
    fn test_non_finite_position_rejected() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::new(f32::NAN, 0.0, 0.0)];
        let result = SculptMesh::from_parts(positions, vec![[0, 1, 2]]);
        assert!(matches!(result, Err(MeshError::NonFinitePosition(2))));
    }
}
