//! Maps a control-point delta stream onto camera orbit.
//!
//! The stream carries movement since the orbit gesture began, not
//! absolute positions. Angles are recomputed from the gesture-start
//! orientation each tick, so a stationary hand holds a stationary
//! camera, and an exponential moving average on the delta suppresses
//! tracking jitter.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::camera::OrbitCamera;

/// Orbit gesture controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitController {
    /// Radians of orbit per unit of control-point delta.
    pub sensitivity: f32,
    /// EMA factor applied to the incoming delta, in (0, 1]. Lower is
    /// smoother and laggier.
    pub smoothing: f32,
    /// Smoothed delta for the current gesture.
    smoothed: Vec2,
    /// Camera orientation captured when the gesture began.
    origin: Option<(f32, f32)>,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self {
            sensitivity: 2.0,
            smoothing: 0.25,
            smoothed: Vec2::ZERO,
            origin: None,
        }
    }
}

impl OrbitController {
    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }

    /// Begin an orbit gesture, capturing the camera's current angles.
    pub fn begin(&mut self, camera: &OrbitCamera) {
        self.origin = Some((camera.yaw, camera.pitch));
        self.smoothed = Vec2::ZERO;
    }

    /// Apply this tick's gesture delta (horizontal, vertical).
    ///
    /// Horizontal movement maps to yaw, vertical to pitch. No-op if no
    /// gesture is active.
    pub fn update(&mut self, delta: Vec2, camera: &mut OrbitCamera) {
        let Some((yaw0, pitch0)) = self.origin else {
            return;
        };

        self.smoothed = self.smoothed.lerp(delta, self.smoothing);

        camera.yaw = yaw0 - self.smoothed.x * self.sensitivity;
        camera.pitch = pitch0 - self.smoothed.y * self.sensitivity;
        camera.clamp_pitch();
    }

    /// End the gesture. The camera keeps its current orientation.
    pub fn end(&mut self) {
        self.origin = None;
        self.smoothed = Vec2::ZERO;
    }
}
