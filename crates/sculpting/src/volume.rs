//! Global volume tracking and correction.
//!
//! Repeated local pulls can grow or collapse the mesh without bound.
//! After every applied deformation the volume ratio against the
//! session-start baseline is clamped back to the configured band with
//! one uniform scale about the centroid — local shape changes are never
//! constrained, only global volume.

use mesh::SculptMesh;
use tracing::{debug, warn};

/// Baseline volume below which correction is skipped as degenerate.
const DEGENERATE_VOLUME: f32 = 1e-6;

/// Outcome of a volume correction pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeCorrection {
    /// Ratio inside bounds; nothing changed.
    InBounds { ratio: f32 },
    /// Ratio left the band; a uniform scale restored the nearest bound.
    Corrected { ratio: f32, corrected_to: f32 },
    /// Baseline volume is numerically zero; correction skipped.
    DegenerateBaseline,
}

/// Tracks the session-start volume and corrects drift.
#[derive(Debug, Clone)]
pub struct VolumeTracker {
    session_volume: f32,
}

impl VolumeTracker {
    /// Capture the baseline volume at session start.
    pub fn begin_session(mesh: &SculptMesh) -> Self {
        let session_volume = mesh.signed_volume().abs();
        if session_volume < DEGENERATE_VOLUME {
            warn!(session_volume, "session started with near-zero volume, correction disabled");
        }
        Self { session_volume }
    }

    pub fn session_volume(&self) -> f32 {
        self.session_volume
    }

    /// Current volume relative to the session baseline.
    pub fn ratio(&self, mesh: &SculptMesh) -> Option<f32> {
        if self.session_volume < DEGENERATE_VOLUME {
            return None;
        }
        Some(mesh.signed_volume().abs() / self.session_volume)
    }

    /// Clamp the volume ratio into `[lower_bound, upper_bound]`.
    ///
    /// Applies at most one uniform scale about the centroid; scaling by
    /// `s` scales volume by `s³`, so `s = (target / ratio)^(1/3)`.
    pub fn correct(
        &self,
        mesh: &mut SculptMesh,
        lower_bound: f32,
        upper_bound: f32,
    ) -> VolumeCorrection {
        let Some(ratio) = self.ratio(mesh) else {
            return VolumeCorrection::DegenerateBaseline;
        };

        if (lower_bound..=upper_bound).contains(&ratio) {
            return VolumeCorrection::InBounds { ratio };
        }

        let target = if ratio > upper_bound { upper_bound } else { lower_bound };
        let scale = (target / ratio).cbrt();
        mesh.scale_about(mesh.centroid(), scale);
        debug!(ratio, target, scale, "volume corrected to nearest bound");

        VolumeCorrection::Corrected { ratio, corrected_to: target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_bounds_untouched() {
        let mut cube = SculptMesh::unit_cube();
        let tracker = VolumeTracker::begin_session(&cube);
        let before = cube.positions().to_vec();

        let outcome = tracker.correct(&mut cube, 0.85, 1.25);
        assert!(matches!(outcome, VolumeCorrection::InBounds { ratio } if (ratio - 1.0).abs() < 1e-5));
        assert_eq!(cube.positions(), before.as_slice());
    }

    #[test]
    fn test_overgrowth_clamped_to_upper_bound() {
        let mut cube = SculptMesh::unit_cube();
        let tracker = VolumeTracker::begin_session(&cube);

        // Grow volume by 50%: ratio 1.5 is above the 1.25 bound.
        cube.scale_about(cube.centroid(), 1.5f32.cbrt());
        let outcome = tracker.correct(&mut cube, 0.85, 1.25);

        assert!(matches!(outcome, VolumeCorrection::Corrected { corrected_to, .. } if corrected_to == 1.25));
        let ratio = tracker.ratio(&cube).unwrap();
        assert!((ratio - 1.25).abs() < 1e-3, "ratio after correction: {ratio}");
    }

    #[test]
    fn test_collapse_clamped_to_lower_bound() {
        let mut cube = SculptMesh::unit_cube();
        let tracker = VolumeTracker::begin_session(&cube);

        cube.scale_about(cube.centroid(), 0.5f32.cbrt());
        tracker.correct(&mut cube, 0.85, 1.25);

        let ratio = tracker.ratio(&cube).unwrap();
        assert!((ratio - 0.85).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_baseline_skipped() {
        // A flat sheet has zero enclosed volume.
        let positions = vec![
            glam::Vec3::ZERO,
            glam::Vec3::X,
            glam::Vec3::Y,
            glam::Vec3::new(1.0, 1.0, 0.0),
        ];
        let mut sheet = SculptMesh::from_parts(positions, vec![[0, 1, 2], [1, 3, 2]]).unwrap();
        let tracker = VolumeTracker::begin_session(&sheet);

        let before = sheet.positions().to_vec();
        let outcome = tracker.correct(&mut sheet, 0.85, 1.25);
        assert_eq!(outcome, VolumeCorrection::DegenerateBaseline);
        assert_eq!(sheet.positions(), before.as_slice());
    }

    #[test]
    fn test_correction_preserves_centroid() {
        let mut cube = SculptMesh::unit_cube();
        let tracker = VolumeTracker::begin_session(&cube);

        cube.scale_about(cube.centroid(), 1.4);
        let centroid_before = cube.centroid();
        tracker.correct(&mut cube, 0.85, 1.25);

        assert!((cube.centroid() - centroid_before).length() < 1e-5);
    }
}
