//! Orbit camera state.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera orbiting a fixed world pivot.
///
/// Orbiting about the pivot rather than the camera's own position is
/// what keeps the view from drifting over a long session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitCamera {
    /// Point the camera orbits around. Fixed for the session.
    pub pivot: Vec3,
    /// Distance from the pivot.
    pub distance: f32,
    /// Horizontal angle (yaw) in radians.
    pub yaw: f32,
    /// Vertical angle (pitch) in radians.
    pub pitch: f32,
    /// Minimum distance from the pivot.
    pub min_distance: f32,
    /// Maximum distance from the pivot.
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        // Default position: (5, 5, 5) looking at the origin.
        // distance = sqrt(75) ≈ 8.66, yaw = PI/4, pitch ≈ 0.615 rad.
        Self {
            pivot: Vec3::ZERO,
            distance: 8.66,
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: 0.615,
            min_distance: 0.5,
            max_distance: 200.0,
        }
    }
}

impl OrbitCamera {
    /// World-space camera position from the orbit parameters.
    pub fn position(&self) -> Vec3 {
        // Spherical to Cartesian; pitch is elevation from the horizontal
        // plane, yaw is the angle around Y.
        let horizontal_distance = self.distance * self.pitch.cos();
        let y = self.distance * self.pitch.sin();
        let x = horizontal_distance * self.yaw.sin();
        let z = horizontal_distance * self.yaw.cos();

        self.pivot + Vec3::new(x, y, z)
    }

    /// Clamp pitch just below straight up/down to prevent flipping.
    pub fn clamp_pitch(&mut self) {
        self.pitch = self.pitch.clamp(-1.5, 1.5);
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(self.min_distance, self.max_distance);
    }

    /// Reset to the default view.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
