//! Editable triangle mesh for the Airsculpt sculpting engine.
//!
//! The mesh has fixed topology for the lifetime of a sculpting session:
//! only vertex positions mutate. This crate provides:
//! - The [`SculptMesh`] value type (positions, normals, faces, adjacency)
//! - Signed volume and centroid for volume-preserving correction
//! - Octree spatial indices for brush-radius queries and ray casting

pub mod mesh;
pub mod raycast;
pub mod spatial;

pub use mesh::{MeshError, SculptMesh};
pub use raycast::{Ray, RayHit};
pub use spatial::{Aabb, TriangleOctree, VertexOctree};
