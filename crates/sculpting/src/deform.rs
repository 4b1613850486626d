//! Per-brush vertex displacement rules.
//!
//! Displacements are accumulated into a [`DisplacementField`] and
//! applied in one batch, so every rule reads pre-deformation positions
//! and multiple influence sources (primary points, anchors, momentum)
//! compose without ordering artifacts.

use glam::Vec3;
use mesh::SculptMesh;

use crate::falloff::FalloffCurve;

/// Base step scale keeping per-tick displacement in a workable range.
const DISPLACEMENT_STEP: f32 = 0.1;

/// One influence source for a tick: an effective (surface-projected)
/// control-point position plus its strength scale. Primary points use
/// scale 1.0; anchors carry the configured multiplier.
#[derive(Debug, Clone, Copy)]
pub struct InfluencePoint {
    pub position: Vec3,
    pub strength_scale: f32,
}

/// Accumulated per-vertex displacement for one tick.
#[derive(Debug)]
pub struct DisplacementField {
    offsets: Vec<Vec3>,
    touched: Vec<u32>,
    dirty: Vec<bool>,
}

impl DisplacementField {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            offsets: vec![Vec3::ZERO; vertex_count],
            touched: Vec::new(),
            dirty: vec![false; vertex_count],
        }
    }

    pub fn clear(&mut self) {
        for &index in &self.touched {
            self.offsets[index as usize] = Vec3::ZERO;
            self.dirty[index as usize] = false;
        }
        self.touched.clear();
    }

    pub fn add(&mut self, index: u32, offset: Vec3) {
        if !self.dirty[index as usize] {
            self.dirty[index as usize] = true;
            self.touched.push(index);
        }
        self.offsets[index as usize] += offset;
    }

    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    pub fn touched(&self) -> &[u32] {
        &self.touched
    }

    pub fn offset(&self, index: u32) -> Vec3 {
        self.offsets[index as usize]
    }

    /// Write the accumulated offsets into the mesh. Returns the number
    /// of vertices moved. Does not recompute normals; the caller
    /// batches that per tick.
    pub fn apply(&self, mesh: &mut SculptMesh) -> usize {
        for &index in &self.touched {
            let position = mesh.position(index) + self.offsets[index as usize];
            mesh.set_position(index, position);
        }
        self.touched.len()
    }
}

/// Pinch: displace vertices toward the nearest influence point.
pub fn accumulate_pinch(
    mesh: &SculptMesh,
    affected: &[u32],
    points: &[InfluencePoint],
    radius: f32,
    strength: f32,
    falloff: FalloffCurve,
    field: &mut DisplacementField,
) {
    if points.is_empty() {
        return;
    }
    for &index in affected {
        let position = mesh.position(index);

        // Nearest influence point wins; its strength scale applies.
        let mut nearest = points[0];
        let mut nearest_dist = position.distance(nearest.position);
        for point in &points[1..] {
            let dist = position.distance(point.position);
            if dist < nearest_dist {
                nearest = *point;
                nearest_dist = dist;
            }
        }

        let weight = falloff.influence(nearest_dist, radius) * nearest.strength_scale;
        if weight <= 0.0 {
            continue;
        }

        let direction = (nearest.position - position).normalize_or_zero();
        field.add(index, direction * weight * strength * DISPLACEMENT_STEP);
    }
}

/// Grab: displace vertices by the control point's frame-to-frame delta.
///
/// The only rule driven by movement rather than position; the caller
/// records the resulting offsets as per-vertex momentum.
pub fn accumulate_grab(
    mesh: &SculptMesh,
    affected: &[u32],
    point: InfluencePoint,
    delta: Vec3,
    radius: f32,
    falloff: FalloffCurve,
    field: &mut DisplacementField,
) {
    for &index in affected {
        let distance = mesh.position(index).distance(point.position);
        let weight = falloff.influence(distance, radius) * point.strength_scale;
        if weight <= 0.0 {
            continue;
        }
        field.add(index, delta * weight);
    }
}

/// Smooth: blend vertices toward their topological neighbor average.
pub fn accumulate_smooth(
    mesh: &SculptMesh,
    affected: &[u32],
    point: InfluencePoint,
    radius: f32,
    strength: f32,
    falloff: FalloffCurve,
    field: &mut DisplacementField,
) {
    for &index in affected {
        let position = mesh.position(index);
        let distance = position.distance(point.position);
        let weight = falloff.influence(distance, radius) * point.strength_scale;
        if weight <= 0.0 {
            continue;
        }

        let neighbors = mesh.neighbors(index);
        if neighbors.is_empty() {
            continue;
        }
        let mut average = Vec3::ZERO;
        for &neighbor in neighbors {
            average += mesh.position(neighbor);
        }
        average /= neighbors.len() as f32;

        field.add(index, (average - position) * weight * strength);
    }
}

/// Inflate: displace vertices along their own normals. The strength
/// sign selects outward or inward.
pub fn accumulate_inflate(
    mesh: &SculptMesh,
    affected: &[u32],
    point: InfluencePoint,
    radius: f32,
    strength: f32,
    falloff: FalloffCurve,
    field: &mut DisplacementField,
) {
    for &index in affected {
        let distance = mesh.position(index).distance(point.position);
        let weight = falloff.influence(distance, radius) * point.strength_scale;
        if weight <= 0.0 {
            continue;
        }
        let direction = mesh.normal(index);
        field.add(index, direction * strength * weight * DISPLACEMENT_STEP);
    }
}

/// Flatten: displace vertices toward the weighted-average plane of the
/// affected region, along the plane normal.
pub fn accumulate_flatten(
    mesh: &SculptMesh,
    affected: &[u32],
    point: InfluencePoint,
    radius: f32,
    strength: f32,
    falloff: FalloffCurve,
    field: &mut DisplacementField,
) {
    // First pass: weighted-average plane of everything within radius.
    let mut plane_origin = Vec3::ZERO;
    let mut plane_normal = Vec3::ZERO;
    let mut total_weight = 0.0;
    for &index in affected {
        let position = mesh.position(index);
        let weight = falloff.influence(position.distance(point.position), radius);
        if weight <= 0.0 {
            continue;
        }
        plane_origin += position * weight;
        plane_normal += mesh.normal(index) * weight;
        total_weight += weight;
    }
    if total_weight <= 0.0 {
        return;
    }
    plane_origin /= total_weight;
    let plane_normal = plane_normal.normalize_or_zero();
    if plane_normal == Vec3::ZERO {
        // Normals cancelled out (e.g. opposing faces); no meaningful
        // plane to flatten against this tick.
        return;
    }

    // Second pass: pull each vertex toward the plane.
    for &index in affected {
        let position = mesh.position(index);
        let weight = falloff.influence(position.distance(point.position), radius)
            * point.strength_scale;
        if weight <= 0.0 {
            continue;
        }
        let distance_to_plane = (position - plane_origin).dot(plane_normal);
        field.add(index, -plane_normal * distance_to_plane * weight * strength);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_and_field() -> (SculptMesh, DisplacementField) {
        let mesh = SculptMesh::unit_cube();
        let field = DisplacementField::new(mesh.vertex_count());
        (mesh, field)
    }

    fn primary(position: Vec3) -> InfluencePoint {
        InfluencePoint { position, strength_scale: 1.0 }
    }

    #[test]
    fn test_pinch_moves_toward_point() {
        let (mut mesh, mut field) = cube_and_field();
        let target = Vec3::new(0.0, 0.0, 0.5);
        let affected = vec![4, 5, 6, 7]; // +Z face corners

        accumulate_pinch(
            &mesh,
            &affected,
            &[primary(target)],
            1.0,
            0.5,
            FalloffCurve::Smooth,
            &mut field,
        );
        field.apply(&mut mesh);

        for &index in &affected {
            let before = SculptMesh::unit_cube().position(index);
            let after = mesh.position(index);
            assert!(
                after.distance(target) < before.distance(target),
                "vertex {index} did not move toward the pinch point"
            );
        }
        // Vertices on the far face were never in the affected set.
        assert_eq!(mesh.position(0), Vec3::new(-0.5, -0.5, -0.5));
    }

    #[test]
    fn test_anchor_displaces_more_than_primary() {
        let (mesh, mut field) = cube_and_field();
        let affected = vec![6u32];
        let point = Vec3::new(0.6, 0.6, 0.6);

        accumulate_pinch(&mesh, &affected, &[primary(point)], 1.0, 0.5, FalloffCurve::Smooth, &mut field);
        let primary_offset = field.offset(6).length();

        field.clear();
        let anchor = InfluencePoint { position: point, strength_scale: 3.0 };
        accumulate_pinch(&mesh, &affected, &[anchor], 1.0, 0.5, FalloffCurve::Smooth, &mut field);
        let anchor_offset = field.offset(6).length();

        assert!(anchor_offset > primary_offset);
        assert!((anchor_offset - primary_offset * 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_pinch_targets_nearest_point() {
        let (mesh, mut field) = cube_and_field();
        let near = Vec3::new(0.6, 0.5, 0.5); // close to vertex 6
        let far = Vec3::new(-5.0, 0.0, 0.0);

        accumulate_pinch(
            &mesh,
            &[6],
            &[primary(far), primary(near)],
            1.0,
            0.5,
            FalloffCurve::Smooth,
            &mut field,
        );
        let offset = field.offset(6);
        // Displacement points at the near point, not the far one.
        assert!(offset.dot(near - mesh.position(6)) > 0.0);
    }

    #[test]
    fn test_grab_follows_delta() {
        let (mesh, mut field) = cube_and_field();
        let delta = Vec3::new(0.2, 0.0, 0.0);

        accumulate_grab(
            &mesh,
            &[6],
            primary(mesh.position(6)),
            delta,
            1.0,
            FalloffCurve::Smooth,
            &mut field,
        );

        // Weight at distance 0 is 1.0, so the vertex carries the full delta.
        assert!((field.offset(6) - delta).length() < 1e-5);
    }

    #[test]
    fn test_smooth_moves_toward_neighbor_average() {
        let (mut mesh, mut field) = cube_and_field();
        // Perturb one corner outward, then smooth it back.
        let spike = Vec3::new(1.5, 1.5, 1.5);
        mesh.set_position(6, spike);

        let mut average = Vec3::ZERO;
        for &n in mesh.neighbors(6) {
            average += mesh.position(n);
        }
        average /= mesh.neighbors(6).len() as f32;
        let before = spike.distance(average);

        accumulate_smooth(&mesh, &[6], primary(spike), 1.0, 0.5, FalloffCurve::Smooth, &mut field);
        field.apply(&mut mesh);

        assert!(mesh.position(6).distance(average) < before);
    }

    #[test]
    fn test_inflate_sign_selects_direction() {
        let (mesh, mut field) = cube_and_field();
        let center = mesh.position(6);

        accumulate_inflate(&mesh, &[6], primary(center), 1.0, 0.5, FalloffCurve::Smooth, &mut field);
        let outward = field.offset(6);
        assert!(outward.dot(mesh.normal(6)) > 0.0);

        field.clear();
        accumulate_inflate(&mesh, &[6], primary(center), 1.0, -0.5, FalloffCurve::Smooth, &mut field);
        let inward = field.offset(6);
        assert!(inward.dot(mesh.normal(6)) < 0.0);
        assert!((outward + inward).length() < 1e-6);
    }

    #[test]
    fn test_flatten_reduces_plane_distance() {
        let (mut mesh, mut field) = cube_and_field();
        // Spike one +Z corner out of the face plane.
        mesh.set_position(6, Vec3::new(0.5, 0.5, 1.0));
        mesh.recompute_normals();

        let affected = vec![4, 5, 6, 7];
        let point = primary(Vec3::new(0.0, 0.0, 0.7));

        // Spread of z-coordinates before and after flattening.
        let spread = |m: &SculptMesh| {
            let zs: Vec<f32> = affected.iter().map(|&i| m.position(i).z).collect();
            zs.iter().cloned().fold(f32::MIN, f32::max) - zs.iter().cloned().fold(f32::MAX, f32::min)
        };
        let before = spread(&mesh);

        accumulate_flatten(&mesh, &affected, point, 1.5, 0.8, FalloffCurve::Smooth, &mut field);
        field.apply(&mut mesh);

        assert!(spread(&mesh) < before);
    }

    #[test]
    fn test_field_clear_resets_offsets() {
        let (mesh, mut field) = cube_and_field();
        accumulate_pinch(
            &mesh,
            &[6],
            &[primary(Vec3::ONE)],
            2.0,
            0.5,
            FalloffCurve::Smooth,
            &mut field,
        );
        assert!(!field.is_empty());
        field.clear();
        assert!(field.is_empty());
        assert_eq!(field.offset(6), Vec3::ZERO);
    }

    #[test]
    fn test_out_of_radius_untouched() {
        let (mesh, mut field) = cube_and_field();
        // All 8 corners passed in, but the radius only reaches vertex 6.
        let all: Vec<u32> = (0..8).collect();
        accumulate_pinch(
            &mesh,
            &all,
            &[primary(Vec3::new(0.55, 0.55, 0.55))],
            0.2,
            0.5,
            FalloffCurve::Smooth,
            &mut field,
        );
        assert_eq!(field.touched(), &[6]);
    }
}
