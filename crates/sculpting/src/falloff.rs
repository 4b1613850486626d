//! Brush falloff curves.
//!
//! Every curve is continuous, monotonically non-increasing, 1.0 at the
//! brush center and exactly 0.0 at the radius boundary — a hard edge at
//! the boundary would leave visible creases in the sculpt.

use serde::{Deserialize, Serialize};

/// Falloff curve for brush influence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum FalloffCurve {
    /// Linear falloff: strength = 1 - d.
    Linear = 0,
    /// Smooth falloff: hermite interpolation. The default; zero
    /// gradient at both ends.
    #[default]
    Smooth = 1,
    /// Sharp falloff: quadratic decay.
    Sharp = 2,
    /// Sphere: spherical falloff, sqrt(1 - d²).
    Sphere = 3,
}

impl FalloffCurve {
    /// Falloff strength at a normalized distance (0.0 = center, 1.0 = edge).
    pub fn evaluate(&self, normalized_distance: f32) -> f32 {
        let d = normalized_distance.clamp(0.0, 1.0);
        match self {
            FalloffCurve::Linear => 1.0 - d,
            FalloffCurve::Smooth => {
                // Hermite smoothstep: 3t² - 2t³
                let t = 1.0 - d;
                t * t * (3.0 - 2.0 * t)
            }
            FalloffCurve::Sharp => {
                let t = 1.0 - d;
                t * t
            }
            FalloffCurve::Sphere => (1.0 - d * d).max(0.0).sqrt(),
        }
    }

    /// Influence weight for a world-space distance from the brush center.
    ///
    /// Zero at and beyond the radius, 1.0 at the center. A non-positive
    /// radius has no influence anywhere.
    pub fn influence(&self, distance: f32, radius: f32) -> f32 {
        if radius <= 0.0 || distance >= radius {
            return 0.0;
        }
        self.evaluate(distance / radius)
    }
}
