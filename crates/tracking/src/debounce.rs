//! Hand-activity debounce.
//!
//! A single malformed or missing record is a transient input fault: the
//! engine holds the last known-good record and resumes on the next
//! valid one. Only after more than `grace_ticks` consecutive stale
//! ticks is the hand considered gone, which forces any gesture it was
//! driving back to idle.

use tracing::{debug, trace};

use crate::record::HandRecord;

/// What the debounce saw for one hand this tick.
#[derive(Debug)]
pub enum HandObservation<'a> {
    /// A valid record arrived this tick.
    Fresh(&'a HandRecord),
    /// No valid record, but still within the grace period: the engine
    /// must hold state and apply no update.
    Held(&'a HandRecord),
    /// The grace period just expired; emitted exactly once.
    Dropped,
    /// No hand is being tracked.
    Idle,
}

/// Per-hand grace-period state machine.
#[derive(Debug)]
pub struct HandDebounce {
    grace_ticks: u32,
    stale_ticks: u32,
    last_valid: Option<HandRecord>,
}

impl HandDebounce {
    pub fn new(grace_ticks: u32) -> Self {
        Self {
            grace_ticks,
            stale_ticks: 0,
            last_valid: None,
        }
    }

    /// Runtime-tunable grace period; takes effect on the next tick.
    pub fn set_grace_ticks(&mut self, grace_ticks: u32) {
        self.grace_ticks = grace_ticks;
    }

    /// Feed this tick's record (or its absence) through the state machine.
    ///
    /// An invalid record is indistinguishable from a missing one.
    pub fn observe(&mut self, record: Option<&HandRecord>) -> HandObservation<'_> {
        match record {
            Some(r) if r.is_valid() => {
                if self.stale_ticks > 0 {
                    trace!(stale_ticks = self.stale_ticks, "hand recovered within grace period");
                }
                self.stale_ticks = 0;
                HandObservation::Fresh(self.last_valid.insert(r.clone()))
            }
            _ => {
                if self.last_valid.is_none() {
                    HandObservation::Idle
                // Already held for the full grace period: the hand is gone.
                } else if self.stale_ticks >= self.grace_ticks {
                    debug!(grace_ticks = self.grace_ticks, "hand lost, grace period expired");
                    self.stale_ticks = 0;
                    self.last_valid = None;
                    HandObservation::Dropped
                } else {
                    self.stale_ticks += 1;
                    HandObservation::Held(self.last_valid.as_ref().unwrap())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ControlPoint, ControlPointRole};
    use glam::Vec3;

    fn valid_record() -> HandRecord {
        HandRecord {
            active: true,
            points: vec![ControlPoint {
                slot: 0,
                role: ControlPointRole::Primary,
                position: Vec3::ONE,
                active: true,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_idle_until_first_record() {
        let mut debounce = HandDebounce::new(3);
        assert!(matches!(debounce.observe(None), HandObservation::Idle));
        assert!(matches!(debounce.observe(None), HandObservation::Idle));
    }

    #[test]
    fn test_holds_for_exactly_grace_ticks() {
        let mut debounce = HandDebounce::new(3);
        let record = valid_record();
        assert!(matches!(debounce.observe(Some(&record)), HandObservation::Fresh(_)));

        // Exactly grace_ticks stale ticks are held...
        assert!(matches!(debounce.observe(None), HandObservation::Held(_)));
        assert!(matches!(debounce.observe(None), HandObservation::Held(_)));
        assert!(matches!(debounce.observe(None), HandObservation::Held(_)));
        // ...the next one drops, once, then idle.
        assert!(matches!(debounce.observe(None), HandObservation::Dropped));
        assert!(matches!(debounce.observe(None), HandObservation::Idle));
    }

    #[test]
    fn test_recovery_within_grace_resets_counter() {
        let mut debounce = HandDebounce::new(2);
        let record = valid_record();
        debounce.observe(Some(&record));
        assert!(matches!(debounce.observe(None), HandObservation::Held(_)));
        assert!(matches!(debounce.observe(Some(&record)), HandObservation::Fresh(_)));
        // Counter restarted: two more held ticks are available again.
        assert!(matches!(debounce.observe(None), HandObservation::Held(_)));
        assert!(matches!(debounce.observe(None), HandObservation::Held(_)));
        assert!(matches!(debounce.observe(None), HandObservation::Dropped));
    }

    #[test]
    fn test_invalid_record_counts_as_missing() {
        let mut debounce = HandDebounce::new(1);
        debounce.observe(Some(&valid_record()));

        let mut broken = valid_record();
        broken.points[0].position = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(matches!(debounce.observe(Some(&broken)), HandObservation::Held(_)));
        assert!(matches!(debounce.observe(Some(&broken)), HandObservation::Dropped));
    }

    #[test]
    fn test_reacquire_after_drop_starts_clean() {
        let mut debounce = HandDebounce::new(2);
        let record = valid_record();
        debounce.observe(Some(&record));
        debounce.observe(None);
        debounce.observe(None);
        assert!(matches!(debounce.observe(None), HandObservation::Dropped));

        // A new record re-acquires the hand with a full grace budget.
        assert!(matches!(debounce.observe(Some(&record)), HandObservation::Fresh(_)));
        assert!(matches!(debounce.observe(None), HandObservation::Held(_)));
        assert!(matches!(debounce.observe(None), HandObservation::Held(_)));
        assert!(matches!(debounce.observe(None), HandObservation::Dropped));
    }

    #[test]
    fn test_held_returns_last_valid_record() {
        let mut debounce = HandDebounce::new(2);
        let record = valid_record();
        debounce.observe(Some(&record));
        match debounce.observe(None) {
            HandObservation::Held(held) => {
                assert_eq!(held.points[0].position, Vec3::ONE);
            }
            other => panic!("expected Held, got {other:?}"),
        }
    }
}
