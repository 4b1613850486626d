//! Tick-driven ingestion of tracker frames.
//!
//! The tracker process runs at its own cadence, potentially faster or
//! slower than the render tick. The engine pulls the latest available
//! frame at the start of each tick; the debounce layer decides what to
//! do when nothing new arrived.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::record::FrameRecord;

/// Something the engine can pull the latest frame from each tick.
pub trait ControlPointSource {
    /// The newest frame since the last pull, or `None` if nothing new
    /// arrived this tick.
    fn latest(&mut self) -> Option<FrameRecord>;
}

/// Single-value handoff slot shared with the tracker thread.
///
/// The writer overwrites, the reader consumes: if the tracker outpaces
/// the render tick only the newest frame survives, and if it lags the
/// reader sees `None` and the grace period takes over.
#[derive(Debug, Clone, Default)]
pub struct LatestSlot {
    inner: Arc<Mutex<Option<FrameRecord>>>,
}

impl LatestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a frame, replacing any unconsumed one.
    pub fn publish(&self, frame: FrameRecord) {
        *self.lock() = Some(frame);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<FrameRecord>> {
        // A poisoned lock only means the tracker thread panicked while
        // holding it; the slot contents are still a whole frame.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl ControlPointSource for LatestSlot {
    fn latest(&mut self) -> Option<FrameRecord> {
        self.lock().take()
    }
}

/// Deterministic frame source for tests: yields a scripted sequence,
/// where `None` entries model ticks on which no frame arrived.
#[derive(Debug, Default)]
pub struct ReplaySource {
    frames: VecDeque<Option<FrameRecord>>,
}

impl ReplaySource {
    pub fn new(frames: impl IntoIterator<Item = Option<FrameRecord>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn push(&mut self, frame: Option<FrameRecord>) {
        self.frames.push_back(frame);
    }
}

impl ControlPointSource for ReplaySource {
    fn latest(&mut self) -> Option<FrameRecord> {
        self.frames.pop_front().flatten()
    }
}
