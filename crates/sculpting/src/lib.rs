//! Real-time deformable-mesh sculpting for Airsculpt.
//!
//! This crate turns a stream of tracked control points (fingertips)
//! into continuous deformation of a single fixed-topology mesh.
//!
//! # Architecture
//!
//! Each host tick, [`engine::SculptSession::tick`] pulls the latest
//! tracking record, routes it through the per-hand debounce, and either
//! orbits the camera or sculpts:
//!
//! - **Falloff & brush policy** ([`falloff`], [`brush`], [`deform`]):
//!   pure distance-to-weight curves and per-brush displacement rules.
//! - **Surface projector** ([`project`]): snaps control points onto the
//!   mesh surface via ray casting so fingertips keep tactile
//!   correspondence instead of disappearing inside the mesh.
//! - **Volume tracker** ([`volume`]): signed-volume ratio correction
//!   about the centroid, bounding global growth/collapse.
//! - **History buffer** ([`history`]): bounded FIFO ring of snapshots,
//!   one per completed gesture.
//!
//! All tuning constants live in [`config::SculptConfig`] and may be
//! changed mid-session for interactive calibration.

pub mod brush;
pub mod config;
pub mod deform;
pub mod engine;
pub mod falloff;
pub mod history;
pub mod project;
pub mod volume;

pub use brush::{Brush, BrushKind, BrushSelector, RadiusTier};
pub use config::SculptConfig;
pub use engine::{EngineEvent, Marker, SculptSession, SessionError, TickReport};
pub use falloff::FalloffCurve;
pub use history::{HistoryBuffer, Snapshot};
