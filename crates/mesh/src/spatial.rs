//! Octree spatial indices for sculpting queries.
//!
//! Two indices are kept per mesh: a vertex octree for brush-radius
//! sphere queries and a triangle octree for control-point ray casts.
//! Topology never changes, but positions move every sculpting tick, so
//! both indices are built in one bulk pass from the mesh when
//! invalidated instead of supporting incremental updates.

use glam::{BVec3, Vec3};
use tracing::trace;

use crate::mesh::SculptMesh;
use crate::raycast::{Ray, RayHit, ray_aabb_intersection, ray_triangle_intersection};

/// Configuration for octree construction.
#[derive(Debug, Clone)]
pub struct OctreeConfig {
    /// Maximum depth of the octree.
    pub max_depth: u32,
    /// Maximum items per leaf node before splitting.
    pub max_items_per_leaf: usize,
    /// Minimum node size (prevents infinite subdivision).
    pub min_node_size: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_items_per_leaf: 16,
            min_node_size: 0.01,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        (self.min.cmple(other.max) & self.max.cmpge(other.min)).all()
    }

    /// Child index for a point: one bit per axis of the half-space it
    /// falls in (x = bit 0, y = bit 1, z = bit 2).
    fn child_of(&self, point: Vec3) -> usize {
        point.cmpge(self.center()).bitmask() as usize
    }

    /// Bounds of one of the eight children, addressed as in [`child_of`].
    ///
    /// [`child_of`]: Aabb::child_of
    fn child_box(&self, child: usize) -> Aabb {
        let center = self.center();
        let upper = BVec3::new(child & 1 != 0, child & 2 != 0, child & 4 != 0);
        Aabb::new(
            Vec3::select(upper, center, self.min),
            Vec3::select(upper, self.max, center),
        )
    }

    /// Whether a box holding `item_count` items is worth subdividing.
    fn worth_splitting(&self, item_count: usize, depth: u32, config: &OctreeConfig) -> bool {
        item_count > config.max_items_per_leaf
            && depth < config.max_depth
            && self.size().min_element() > config.min_node_size * 2.0
    }
}

/// Pad bounds slightly so vertices sitting exactly on the hull are inside.
fn padded_bounds(mut bounds: Aabb) -> Aabb {
    let padding = bounds.size() * 0.01 + Vec3::splat(0.001);
    bounds.min -= padding;
    bounds.max += padding;
    bounds
}

// ---------------------------------------------------------------------------
// Vertex octree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct VertexItem {
    index: u32,
    position: Vec3,
}

#[derive(Debug)]
enum VertexNode {
    Leaf { bounds: Aabb, items: Vec<VertexItem> },
    Internal { bounds: Aabb, children: Vec<VertexNode> },
}

impl VertexNode {
    fn bounds(&self) -> &Aabb {
        match self {
            VertexNode::Leaf { bounds, .. } | VertexNode::Internal { bounds, .. } => bounds,
        }
    }

    /// Partition `items` into a subtree. Vertices land in exactly one
    /// child, so each level strictly narrows the candidate set unless
    /// the points are coincident, which `max_depth` cuts off.
    fn build(bounds: Aabb, items: Vec<VertexItem>, depth: u32, config: &OctreeConfig) -> Self {
        if !bounds.worth_splitting(items.len(), depth, config) {
            return VertexNode::Leaf { bounds, items };
        }

        let mut buckets: [Vec<VertexItem>; 8] = Default::default();
        for item in items {
            buckets[bounds.child_of(item.position)].push(item);
        }

        let children = buckets
            .into_iter()
            .enumerate()
            .filter(|(_, bucket)| !bucket.is_empty())
            .map(|(child, bucket)| Self::build(bounds.child_box(child), bucket, depth + 1, config))
            .collect();
        VertexNode::Internal { bounds, children }
    }

    fn collect_sphere(&self, center: Vec3, radius: f32, results: &mut Vec<u32>) {
        if !self.bounds().intersects_sphere(center, radius) {
            return;
        }
        match self {
            VertexNode::Leaf { items, .. } => {
                let radius_sq = radius * radius;
                results.extend(
                    items
                        .iter()
                        .filter(|item| item.position.distance_squared(center) <= radius_sq)
                        .map(|item| item.index),
                );
            }
            VertexNode::Internal { children, .. } => {
                for child in children {
                    child.collect_sphere(center, radius, results);
                }
            }
        }
    }
}

/// Octree over vertex positions for brush-radius sphere queries.
#[derive(Debug)]
pub struct VertexOctree {
    root: VertexNode,
    len: usize,
}

impl VertexOctree {
    /// Build an octree over the current vertex positions of a mesh.
    pub fn from_mesh(mesh: &SculptMesh) -> Self {
        Self::from_mesh_with_config(mesh, OctreeConfig::default())
    }

    pub fn from_mesh_with_config(mesh: &SculptMesh, config: OctreeConfig) -> Self {
        let items: Vec<VertexItem> = mesh
            .positions()
            .iter()
            .enumerate()
            .map(|(i, &position)| VertexItem { index: i as u32, position })
            .collect();
        let len = items.len();
        let root = VertexNode::build(padded_bounds(mesh.bounds()), items, 0, &config);
        trace!(vertices = len, "vertex octree built");
        Self { root, len }
    }

    /// All vertex indices within `radius` of `center`.
    pub fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<u32> {
        let mut results = Vec::new();
        self.root.collect_sphere(center, radius, &mut results);
        results
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ---------------------------------------------------------------------------
// Triangle octree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct TriangleItem {
    face: u32,
    bounds: Aabb,
}

#[derive(Debug)]
enum TriangleNode {
    Leaf { bounds: Aabb, items: Vec<TriangleItem> },
    Internal { bounds: Aabb, children: Vec<TriangleNode> },
}

impl TriangleNode {
    fn bounds(&self) -> &Aabb {
        match self {
            TriangleNode::Leaf { bounds, .. } | TriangleNode::Internal { bounds, .. } => bounds,
        }
    }

    /// Partition `items` into a subtree. A triangle whose bounds cross
    /// a split plane is kept in every child it touches, so recursion is
    /// bounded by `max_depth` rather than by shrinking item counts.
    fn build(bounds: Aabb, items: Vec<TriangleItem>, depth: u32, config: &OctreeConfig) -> Self {
        if !bounds.worth_splitting(items.len(), depth, config) {
            return TriangleNode::Leaf { bounds, items };
        }

        let children = (0..8)
            .filter_map(|child| {
                let child_bounds = bounds.child_box(child);
                let bucket: Vec<TriangleItem> = items
                    .iter()
                    .filter(|item| child_bounds.intersects(&item.bounds))
                    .copied()
                    .collect();
                (!bucket.is_empty())
                    .then(|| Self::build(child_bounds, bucket, depth + 1, config))
            })
            .collect();
        TriangleNode::Internal { bounds, children }
    }

    fn raycast(&self, mesh: &SculptMesh, ray: &Ray, closest: &mut Option<RayHit>) {
        let Some(entry) = ray_aabb_intersection(ray, self.bounds().min, self.bounds().max) else {
            return;
        };
        // Prune subtrees that cannot beat the current best hit.
        if let Some(best) = closest
            && entry > best.distance
        {
            return;
        }

        match self {
            TriangleNode::Leaf { items, .. } => {
                for item in items {
                    let face = mesh.faces()[item.face as usize];
                    let a = mesh.position(face[0]);
                    let b = mesh.position(face[1]);
                    let c = mesh.position(face[2]);
                    if let Some(t) = ray_triangle_intersection(ray, a, b, c)
                        && closest.is_none_or(|hit| t < hit.distance)
                    {
                        *closest = Some(RayHit {
                            distance: t,
                            point: ray.point_at(t),
                            normal: (b - a).cross(c - a).normalize_or_zero(),
                            face: item.face,
                        });
                    }
                }
            }
            TriangleNode::Internal { children, .. } => {
                for child in children {
                    child.raycast(mesh, ray, closest);
                }
            }
        }
    }
}

/// Octree over triangles for nearest-hit ray queries.
///
/// Triangles whose bounds straddle a split plane are stored in every
/// child they touch; the closest-hit scan makes duplicates harmless.
#[derive(Debug)]
pub struct TriangleOctree {
    root: TriangleNode,
}

impl TriangleOctree {
    /// Build an octree over the current triangles of a mesh.
    pub fn from_mesh(mesh: &SculptMesh) -> Self {
        Self::from_mesh_with_config(mesh, OctreeConfig::default())
    }

    pub fn from_mesh_with_config(mesh: &SculptMesh, config: OctreeConfig) -> Self {
        let items: Vec<TriangleItem> = mesh
            .faces()
            .iter()
            .enumerate()
            .map(|(fi, face)| {
                let mut tri_bounds = Aabb::empty();
                for &idx in face {
                    tri_bounds.include_point(mesh.position(idx));
                }
                TriangleItem { face: fi as u32, bounds: tri_bounds }
            })
            .collect();
        let root = TriangleNode::build(padded_bounds(mesh.bounds()), items, 0, &config);
        trace!(faces = mesh.face_count(), "triangle octree built");
        Self { root }
    }

    /// Nearest ray/mesh intersection, or `None` for a miss.
    pub fn raycast(&self, mesh: &SculptMesh, ray: &Ray) -> Option<RayHit> {
        let mut closest: Option<RayHit> = None;
        self.root.raycast(mesh, ray, &mut closest);
        closest
    }
}
