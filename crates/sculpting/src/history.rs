//! Bounded undo history.
//!
//! One snapshot per completed gesture, never per tick: undo granularity
//! stays meaningful and memory stays bounded. Topology is invariant for
//! the session, so a snapshot is only vertex positions.

use std::collections::VecDeque;

use glam::Vec3;
use tracing::trace;

/// Vertex positions captured at a commit boundary.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub positions: Vec<Vec3>,
    pub timestamp_ms: u64,
}

/// FIFO-evicting, LIFO-popping ring of snapshots.
#[derive(Debug)]
pub struct HistoryBuffer {
    entries: VecDeque<Snapshot>,
    depth: usize,
}

impl HistoryBuffer {
    pub fn new(depth: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(depth.min(64)),
            depth,
        }
    }

    /// Append a snapshot, evicting the oldest beyond the depth limit.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.entries.push_back(snapshot);
        while self.entries.len() > self.depth {
            self.entries.pop_front();
            trace!(depth = self.depth, "evicted oldest history snapshot");
        }
    }

    /// Remove and return the most recent snapshot. Popping an empty
    /// buffer is a no-op by contract, not an error.
    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    /// Runtime-tunable depth; shrinking evicts oldest entries now.
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
        while self.entries.len() > self.depth {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all snapshots (mesh replaced wholesale).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
