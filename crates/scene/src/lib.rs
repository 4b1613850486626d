//! View state for Airsculpt.
//!
//! The camera orbits a fixed world pivot; the controller maps a
//! control-point delta stream onto the orbit angles. Neither touches
//! the mesh or the history buffer.

pub mod camera;
pub mod orbit;

pub use camera::OrbitCamera;
pub use orbit::OrbitController;
