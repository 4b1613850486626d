//! Control-point input contract for Airsculpt.
//!
//! The hand-tracking process lives outside this workspace; it publishes
//! one [`FrameRecord`] per tracker tick. This crate owns the record
//! types, validation, the latest-value handoff, and the per-hand
//! debounce state machine that decides when a hand is really gone.

pub mod debounce;
pub mod record;
pub mod source;

pub use debounce::{HandDebounce, HandObservation};
pub use record::{
    ControlPoint, ControlPointRole, FrameRecord, HandRecord, MAX_POINTS_PER_HAND, ModeSignal,
};
pub use source::{ControlPointSource, LatestSlot, ReplaySource};
