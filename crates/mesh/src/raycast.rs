//! Ray/triangle intersection primitives.
//!
//! The surface projector casts one ray per driving control point per
//! tick, so these tests are written for stability near grazing angles
//! rather than raw throughput.

use glam::Vec3;

/// Epsilon for floating point comparisons.
const EPSILON: f32 = 1e-6;

/// A ray in world space. Direction is expected to be normalized.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray from `origin` toward `target`.
    ///
    /// Returns `None` when the two points coincide and no direction exists.
    pub fn toward(origin: Vec3, target: Vec3) -> Option<Self> {
        let direction = (target - origin).normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        Some(Self { origin, direction })
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray/mesh intersection.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Distance along the ray.
    pub distance: f32,
    /// World-space hit position.
    pub point: Vec3,
    /// Geometric normal of the hit face.
    pub normal: Vec3,
    /// Index of the hit face.
    pub face: u32,
}

/// Möller–Trumbore ray/triangle intersection.
///
/// Returns the distance along the ray, or `None` for a miss. Edge and
/// vertex hits are counted as hits (inclusive barycentric bounds) so a
/// ray through a shared edge cannot slip between two triangles.
pub fn ray_triangle_intersection(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = ray.direction.cross(edge2);
    let det = edge1.dot(p);

    // No backface culling: the projector must see the surface from
    // either side of a grazing ray.
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(-EPSILON..=1.0 + EPSILON).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray.direction.dot(q) * inv_det;
    if v < -EPSILON || u + v > 1.0 + EPSILON {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    if t > EPSILON { Some(t) } else { None }
}

/// Slab test: distance to an AABB entry point along a ray, if any.
///
/// Axes the ray runs parallel to are handled as a containment check,
/// never divided through; an origin sitting exactly on a slab plane
/// would otherwise produce `0.0 * inf = NaN` and poison the result.
pub fn ray_aabb_intersection(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_entry = 0.0f32;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];
        if direction.abs() < EPSILON {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / direction;
        let t1 = (min[axis] - origin) * inv;
        let t2 = (max[axis] - origin) * inv;
        t_entry = t_entry.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
        if t_entry > t_exit {
            return None;
        }
    }
    Some(t_entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_triangle_hit() {
        let ray = Ray {
            origin: Vec3::new(0.25, 0.25, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let t = ray_triangle_intersection(&ray, Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!(t.is_some());
        assert!((t.unwrap() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_ray_triangle_miss() {
        let ray = Ray {
            origin: Vec3::new(2.0, 2.0, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        assert!(ray_triangle_intersection(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_ray_triangle_edge_hit() {
        // A ray exactly through the shared diagonal of a split quad must
        // register on at least one of the two triangles.
        let ray = Ray {
            origin: Vec3::new(0.5, 0.5, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let t = ray_triangle_intersection(&ray, Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!(t.is_some());
    }

    #[test]
    fn test_ray_behind_origin_ignored() {
        let ray = Ray {
            origin: Vec3::new(0.25, 0.25, -5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        assert!(ray_triangle_intersection(&ray, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_ray_aabb() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let t = ray_aabb_intersection(&ray, Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(t.is_some());
        assert!((t.unwrap() - 4.0).abs() < 1e-4);

        let miss = Ray {
            origin: Vec3::new(5.0, 5.0, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        assert!(ray_aabb_intersection(&miss, Vec3::splat(-1.0), Vec3::splat(1.0)).is_none());
    }

    #[test]
    fn test_ray_aabb_origin_on_slab_plane() {
        // Origin exactly on the x = min.x plane with zero x direction:
        // the parallel axis must act as containment, not arithmetic.
        let grazing = Ray {
            origin: Vec3::new(-1.0, 0.0, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        let t = ray_aabb_intersection(&grazing, Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!((t.unwrap() - 4.0).abs() < 1e-4);

        // Just outside the plane on a parallel axis is a miss.
        let outside = Ray {
            origin: Vec3::new(-1.001, 0.0, 5.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
        };
        assert!(ray_aabb_intersection(&outside, Vec3::splat(-1.0), Vec3::splat(1.0)).is_none());
    }

    #[test]
    fn test_ray_toward_degenerate() {
        assert!(Ray::toward(Vec3::ONE, Vec3::ONE).is_none());
    }
}
