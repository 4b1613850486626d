//! Surface snapping for control points.
//!
//! A raw tracked fingertip position usually sits slightly inside or
//! outside the mesh. Casting a ray from the camera through the tracked
//! point and snapping to the nearest surface hit keeps the cursor on
//! the surface the user believes they are touching. A miss falls back
//! to the raw position unmodified.

use std::collections::HashMap;

use glam::Vec3;
use mesh::{Ray, SculptMesh, TriangleOctree};
use tracing::trace;

/// Identifies one control-point slot across ticks within a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey {
    pub hand: u8,
    pub slot: u8,
}

/// Effective control-point position for one tick.
#[derive(Debug, Clone, Copy)]
pub struct ProjectedPoint {
    pub position: Vec3,
    /// Surface normal at the hit, when snapped.
    pub normal: Option<Vec3>,
    /// Whether the position is a surface hit (false = raw fallback).
    pub snapped: bool,
}

/// Ray-casts driving control points against the mesh, with per-point
/// hysteresis so grazing hits cannot oscillate frame to frame.
#[derive(Debug, Default)]
pub struct SurfaceProjector {
    previous_hits: HashMap<PointKey, Vec3>,
}

impl SurfaceProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project one control point. Only call for points currently
    /// driving a gesture; projection is per tick and per point.
    pub fn project(
        &mut self,
        key: PointKey,
        camera_position: Vec3,
        tracked: Vec3,
        mesh: &SculptMesh,
        octree: &TriangleOctree,
        hysteresis: f32,
    ) -> ProjectedPoint {
        let Some(ray) = Ray::toward(camera_position, tracked) else {
            // Camera and tracked point coincide; nothing to cast.
            return ProjectedPoint { position: tracked, normal: None, snapped: false };
        };

        match octree.raycast(mesh, &ray) {
            Some(hit) => {
                // Prefer the previous hit when the new one is within
                // tolerance: grazing rays stay put.
                let position = match self.previous_hits.get(&key) {
                    Some(&previous) if hit.point.distance(previous) <= hysteresis => previous,
                    _ => {
                        self.previous_hits.insert(key, hit.point);
                        hit.point
                    }
                };
                ProjectedPoint { position, normal: Some(hit.normal), snapped: true }
            }
            None => {
                trace!(?key, "projection ray missed mesh, using raw position");
                self.previous_hits.remove(&key);
                ProjectedPoint { position: tracked, normal: None, snapped: false }
            }
        }
    }

    /// Forget cached hits for every slot of a hand (gesture ended).
    pub fn forget_hand(&mut self, hand: u8) {
        self.previous_hits.retain(|key, _| key.hand != hand);
    }

    /// Drop all cached hits (mesh replaced or restored).
    pub fn clear(&mut self) {
        self.previous_hits.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: PointKey = PointKey { hand: 0, slot: 0 };

    fn cube_and_octree() -> (SculptMesh, TriangleOctree) {
        let mesh = SculptMesh::unit_cube();
        let octree = TriangleOctree::from_mesh(&mesh);
        (mesh, octree)
    }

    #[test]
    fn test_snaps_to_surface() {
        let (mesh, octree) = cube_and_octree();
        let mut projector = SurfaceProjector::new();

        // Fingertip 0.1 outside the +Z face center, camera behind it.
        let camera = Vec3::new(0.0, 0.0, 5.0);
        let tracked = Vec3::new(0.0, 0.0, 0.6);
        let projected = projector.project(KEY, camera, tracked, &mesh, &octree, 0.01);

        assert!(projected.snapped);
        assert!((projected.position.z - 0.5).abs() < 1e-4);
        assert!(projected.position.truncate().length() < 1e-4);
        assert!(projected.normal.unwrap().dot(Vec3::Z) > 0.99);
    }

    #[test]
    fn test_miss_falls_back_to_raw() {
        let (mesh, octree) = cube_and_octree();
        let mut projector = SurfaceProjector::new();

        let camera = Vec3::new(0.0, 0.0, 5.0);
        let tracked = Vec3::new(3.0, 3.0, 0.0);
        let projected = projector.project(KEY, camera, tracked, &mesh, &octree, 0.01);

        assert!(!projected.snapped);
        assert_eq!(projected.position, tracked);
        assert!(projected.normal.is_none());
    }

    #[test]
    fn test_unchanged_ray_is_stable() {
        let (mesh, octree) = cube_and_octree();
        let mut projector = SurfaceProjector::new();

        let camera = Vec3::new(0.0, 0.0, 5.0);
        let tracked = Vec3::new(0.12, -0.07, 0.6);
        let first = projector.project(KEY, camera, tracked, &mesh, &octree, 0.01);
        let second = projector.project(KEY, camera, tracked, &mesh, &octree, 0.01);

        assert_eq!(first.position, second.position);
    }

    #[test]
    fn test_hysteresis_reuses_previous_hit() {
        let (mesh, octree) = cube_and_octree();
        let mut projector = SurfaceProjector::new();

        let camera = Vec3::new(0.0, 0.0, 5.0);
        let first = projector.project(KEY, camera, Vec3::new(0.1, 0.1, 0.6), &mesh, &octree, 0.05);

        // Jitter the tracked point by less than the hysteresis distance.
        let second =
            projector.project(KEY, camera, Vec3::new(0.11, 0.1, 0.6), &mesh, &octree, 0.05);
        assert_eq!(first.position, second.position);

        // A large move escapes the hysteresis window.
        let third =
            projector.project(KEY, camera, Vec3::new(0.4, 0.1, 0.6), &mesh, &octree, 0.05);
        assert!(third.position.distance(first.position) > 0.05);
    }

    #[test]
    fn test_forget_hand_clears_cache() {
        let (mesh, octree) = cube_and_octree();
        let mut projector = SurfaceProjector::new();

        let camera = Vec3::new(0.0, 0.0, 5.0);
        projector.project(KEY, camera, Vec3::new(0.1, 0.1, 0.6), &mesh, &octree, 0.05);
        projector.forget_hand(0);

        // After forgetting, a nearby hit is taken fresh, not reused.
        let projected =
            projector.project(KEY, camera, Vec3::new(0.12, 0.1, 0.6), &mesh, &octree, 0.05);
        assert!((projected.position.x - 0.12 * (4.5 / 4.4)).abs() < 0.02);
    }

    #[test]
    fn test_degenerate_ray_uses_raw() {
        let (mesh, octree) = cube_and_octree();
        let mut projector = SurfaceProjector::new();

        let position = Vec3::new(0.0, 0.0, 5.0);
        let projected = projector.project(KEY, position, position, &mesh, &octree, 0.01);
        assert!(!projected.snapped);
        assert_eq!(projected.position, position);
    }
}
