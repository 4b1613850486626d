//! Runtime-tunable sculpting configuration.
//!
//! Values are configurable and should not be treated as magic numbers:
//! the volume bounds and anchor multiplier in particular are tuned
//! empirically during interactive calibration, which is why everything
//! here is a plain public field read fresh every tick.

use serde::{Deserialize, Serialize};

use crate::brush::BrushKind;
use crate::falloff::FalloffCurve;

/// Configuration for the sculpting engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SculptConfig {
    // --- Brush strengths ---
    pub pinch_strength: f32,
    pub grab_strength: f32,
    pub smooth_strength: f32,
    /// Signed: negative inflates inward (deflate).
    pub inflate_strength: f32,
    pub flatten_strength: f32,

    // --- Radius tiers (world units) ---
    pub radius_small: f32,
    pub radius_medium: f32,
    pub radius_large: f32,
    /// Inflate works over roughly double the other brushes' radius.
    /// Documented policy, not incidental.
    pub inflate_radius_factor: f32,

    /// Falloff curve shared by all brushes.
    pub falloff: FalloffCurve,

    /// Strength multiplier for anchor-role points relative to an
    /// equivalent primary point. Must be > 1 so anchors pin harder.
    pub anchor_strength_multiplier: f32,

    // --- Volume correction ---
    /// Lower bound on volume / session-start volume.
    pub volume_lower_bound: f32,
    /// Upper bound on volume / session-start volume.
    pub volume_upper_bound: f32,

    // --- History / undo ---
    /// Maximum snapshots retained (oldest evicted first).
    pub history_depth: usize,
    /// Ticks between pops while the undo signal is held.
    pub undo_repeat_ticks: u32,

    // --- Input handling ---
    /// Consecutive stale ticks tolerated before a hand drops to idle.
    pub grace_ticks: u32,
    /// Control-point movement below this distance counts as a static
    /// hand: no deformation is applied, so a held pose cannot drift.
    pub motion_epsilon: f32,

    // --- Grab momentum ---
    /// Per-tick retention of unresolved grab momentum after release,
    /// in (0, 1). Lower settles faster.
    pub grab_damping: f32,
    /// Momentum below this magnitude is flushed to zero.
    pub settle_epsilon: f32,

    // --- Surface projection ---
    /// A new surface hit within this distance of the previous one
    /// reuses the previous hit, keeping grazing rays stable.
    pub projection_hysteresis: f32,

    // --- Orbit ---
    /// EMA factor for the orbit delta stream, in (0, 1].
    pub orbit_smoothing: f32,
    /// Radians of orbit per unit of control-point delta.
    pub orbit_sensitivity: f32,
}

impl Default for SculptConfig {
    fn default() -> Self {
        Self {
            pinch_strength: 0.5,
            grab_strength: 1.0,
            smooth_strength: 0.3,
            inflate_strength: 0.3,
            flatten_strength: 0.4,

            radius_small: 0.15,
            radius_medium: 0.3,
            radius_large: 0.6,
            inflate_radius_factor: 2.0,

            falloff: FalloffCurve::Smooth,

            anchor_strength_multiplier: 3.0,

            volume_lower_bound: 0.85,
            volume_upper_bound: 1.25,

            history_depth: 32,
            undo_repeat_ticks: 6,

            grace_ticks: 3,
            motion_epsilon: 1e-4,

            grab_damping: 0.65,
            settle_epsilon: 1e-3,

            projection_hysteresis: 0.01,

            orbit_smoothing: 0.25,
            orbit_sensitivity: 2.0,
        }
    }
}

impl SculptConfig {
    /// Nominal strength for a brush kind.
    pub fn strength_for(&self, kind: BrushKind) -> f32 {
        match kind {
            BrushKind::Pinch => self.pinch_strength,
            BrushKind::Grab => self.grab_strength,
            BrushKind::Smooth => self.smooth_strength,
            BrushKind::Inflate => self.inflate_strength,
            BrushKind::Flatten => self.flatten_strength,
        }
    }
}
