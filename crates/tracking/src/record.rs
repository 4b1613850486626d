//! Per-tick tracking records.
//!
//! Records are transient: a new one arrives every tracker tick and no
//! identity persists across ticks beyond "same slot within one
//! continuous gesture". Missing hands or fields mean "inactive", never
//! an error.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Maximum control points reported per hand (one per fingertip).
pub const MAX_POINTS_PER_HAND: usize = 5;

/// Role of a control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlPointRole {
    /// A free influence source that drives the active brush.
    #[default]
    Primary,
    /// A pinning point with an elevated strength multiplier, used to
    /// hold geometry in place while other regions deform.
    Anchor,
}

/// One tracked 3D influence source for a single tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Slot within the hand (0-4). Stable only within one gesture.
    pub slot: u8,
    pub role: ControlPointRole,
    pub position: Vec3,
    pub active: bool,
}

impl ControlPoint {
    pub fn is_valid(&self) -> bool {
        self.position.is_finite() && (self.slot as usize) < MAX_POINTS_PER_HAND
    }
}

/// Discrete mode signal classified by the external gesture tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModeSignal {
    /// Control points drive mesh deformation.
    Deform,
    /// Control points drive camera orbit.
    Orbit,
    /// Cycle the active brush type.
    BrushCycle,
    /// Cycle the radius tier.
    RadiusCycle,
    /// Undo; repeats at a fixed cadence while held.
    Undo,
    /// Confirmatory gesture: the mesh is ready for the next stage.
    CommitDone,
}

/// Everything one hand reports for one tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandRecord {
    pub active: bool,
    /// Up to [`MAX_POINTS_PER_HAND`] free control points.
    #[serde(default)]
    pub points: Vec<ControlPoint>,
    /// Points with the stronger-pin anchor role.
    #[serde(default)]
    pub anchors: Vec<ControlPoint>,
    /// Mode classified for this tick, if any.
    #[serde(default)]
    pub mode: Option<ModeSignal>,
}

impl HandRecord {
    /// A record is usable when every reported point is well-formed.
    ///
    /// Malformed records are treated exactly like a missing record for
    /// the tick: held through the grace period, never surfaced.
    pub fn is_valid(&self) -> bool {
        self.points.len() <= MAX_POINTS_PER_HAND
            && self.anchors.len() <= MAX_POINTS_PER_HAND
            && self.points.iter().all(ControlPoint::is_valid)
            && self.anchors.iter().all(ControlPoint::is_valid)
    }

    /// The primary control point driving a gesture: the first active
    /// point with the [`ControlPointRole::Primary`] role.
    pub fn primary(&self) -> Option<&ControlPoint> {
        self.points
            .iter()
            .find(|p| p.active && p.role == ControlPointRole::Primary)
    }

    /// Active anchor points for this tick.
    pub fn active_anchors(&self) -> impl Iterator<Item = &ControlPoint> {
        self.anchors.iter().filter(|p| p.active)
    }
}

/// A full frame from the tracker: up to two hands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameRecord {
    pub timestamp_ms: u64,
    /// An absent hand is valid and means "inactive".
    #[serde(default)]
    pub hands: [Option<HandRecord>; 2],
}
