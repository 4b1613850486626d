//! Brush selection and resolution.
//!
//! Exactly one brush is active at a time. Selection is stateless from
//! the tracker's point of view: discrete cycle signals step through the
//! brush kinds and radius tiers with wraparound, and the selection
//! persists across ticks until cycled again.

use serde::{Deserialize, Serialize};

use crate::config::SculptConfig;

/// Type of sculpting deformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum BrushKind {
    /// Pull vertices toward the nearest control point.
    #[default]
    Pinch = 0,
    /// Move vertices by the control point's frame-to-frame delta; the
    /// only brush that imparts momentum.
    Grab = 1,
    /// Blend vertices toward their topological neighbor average.
    Smooth = 2,
    /// Displace vertices along their own normals.
    Inflate = 3,
    /// Displace vertices toward the weighted-average plane.
    Flatten = 4,
}

impl BrushKind {
    pub const ALL: [BrushKind; 5] = [
        BrushKind::Pinch,
        BrushKind::Grab,
        BrushKind::Smooth,
        BrushKind::Inflate,
        BrushKind::Flatten,
    ];

    /// Next brush in the cycle, wrapping around.
    pub fn next(self) -> Self {
        match self {
            BrushKind::Pinch => BrushKind::Grab,
            BrushKind::Grab => BrushKind::Smooth,
            BrushKind::Smooth => BrushKind::Inflate,
            BrushKind::Inflate => BrushKind::Flatten,
            BrushKind::Flatten => BrushKind::Pinch,
        }
    }
}

/// Brush radius tier, resolved to a world-unit scalar via the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum RadiusTier {
    Small = 0,
    #[default]
    Medium = 1,
    Large = 2,
}

impl RadiusTier {
    /// Next tier in the cycle, wrapping around.
    pub fn next(self) -> Self {
        match self {
            RadiusTier::Small => RadiusTier::Medium,
            RadiusTier::Medium => RadiusTier::Large,
            RadiusTier::Large => RadiusTier::Small,
        }
    }
}

/// A fully resolved brush for one tick.
#[derive(Debug, Clone, Copy)]
pub struct Brush {
    pub kind: BrushKind,
    /// World-unit radius, inflate doubling already applied.
    pub radius: f32,
    pub strength: f32,
}

/// Current brush/radius selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BrushSelector {
    pub kind: BrushKind,
    pub tier: RadiusTier,
}

impl BrushSelector {
    pub fn cycle_brush(&mut self) -> BrushKind {
        self.kind = self.kind.next();
        self.kind
    }

    pub fn cycle_radius(&mut self) -> RadiusTier {
        self.tier = self.tier.next();
        self.tier
    }

    /// Resolve the selection against the current config.
    pub fn resolve(&self, config: &SculptConfig) -> Brush {
        let tier_radius = match self.tier {
            RadiusTier::Small => config.radius_small,
            RadiusTier::Medium => config.radius_medium,
            RadiusTier::Large => config.radius_large,
        };
        let radius = if self.kind == BrushKind::Inflate {
            tier_radius * config.inflate_radius_factor
        } else {
            tier_radius
        };
        Brush {
            kind: self.kind,
            radius,
            strength: config.strength_for(self.kind),
        }
    }
}
