//! # Completion Tracker
//!
//! Records which steps of a run have completed and merges the result payload
//! each step reports into a single accumulated state.

use crate::error::{Result, WizardError};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// Result payload a step reports when it completes
pub type StepPayload = Map<String, Value>;

/// Merged payloads of every completed step, keyed by payload field
pub type AccumulatedState = Map<String, Value>;

/// Completed step indices plus accumulated result state for one run.
///
/// Membership only grows: there is no operation that un-marks a step.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionTracker {
    step_count: usize,
    completed: BTreeSet<usize>,
    state: AccumulatedState,
}

impl CompletionTracker {
    /// Create an empty tracker for a run of `step_count` steps
    pub fn new(step_count: usize) -> Self {
        Self {
            step_count,
            completed: BTreeSet::new(),
            state: AccumulatedState::new(),
        }
    }

    /// Mark `index` complete and merge `payload` into the accumulated state.
    ///
    /// Re-marking an already completed step is allowed and re-applies the
    /// merge. Keys already present are overwritten (last writer wins).
    /// An out-of-range index is rejected without touching the tracker.
    pub fn mark_complete(&mut self, index: usize, payload: StepPayload) -> Result<()> {
        if index >= self.step_count {
            return Err(WizardError::StepOutOfRange {
                index,
                step_count: self.step_count,
            });
        }

        let newly_completed = self.completed.insert(index);

        for (key, value) in payload {
            if let Some(previous) = self.state.insert(key.clone(), value) {
                debug!(
                    step_index = index,
                    key = %key,
                    previous = %previous,
                    "Accumulated state key overwritten"
                );
            }
        }

        debug!(
            step_index = index,
            newly_completed = newly_completed,
            completed_count = self.completed.len(),
            "Step marked complete"
        );

        Ok(())
    }

    /// Check whether the step at `index` has completed
    pub fn is_complete(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    /// Copy of the accumulated state; later merges are not visible through it
    pub fn snapshot(&self) -> AccumulatedState {
        self.state.clone()
    }

    /// Consume the tracker, yielding the accumulated state
    pub fn into_state(self) -> AccumulatedState {
        self.state
    }

    /// Completed indices in ascending order
    pub fn completed_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.completed.iter().copied()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> StepPayload {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object payload, got {other}"),
        }
    }

    #[test]
    fn test_mark_complete_records_index_and_merges() {
        let mut tracker = CompletionTracker::new(3);
        tracker
            .mark_complete(0, payload(json!({"repoId": "r1", "branch": "main"})))
            .unwrap();

        assert!(tracker.is_complete(0));
        assert!(!tracker.is_complete(1));
        assert_eq!(
            Value::Object(tracker.snapshot()),
            json!({"repoId": "r1", "branch": "main"})
        );
    }

    #[test]
    fn test_last_writer_wins() {
        let mut tracker = CompletionTracker::new(3);
        tracker
            .mark_complete(0, payload(json!({"branch": "main", "repoId": "r1"})))
            .unwrap();
        tracker
            .mark_complete(1, payload(json!({"branch": "import"})))
            .unwrap();

        assert_eq!(
            Value::Object(tracker.snapshot()),
            json!({"branch": "import", "repoId": "r1"})
        );
    }

    #[test]
    fn test_idempotent_membership_reapplies_merge() {
        let mut tracker = CompletionTracker::new(2);
        tracker.mark_complete(1, payload(json!({"a": 1}))).unwrap();
        tracker.mark_complete(1, payload(json!({"a": 2}))).unwrap();

        assert_eq!(tracker.completed_indices().collect::<Vec<_>>(), vec![1]);
        assert_eq!(tracker.snapshot()["a"], json!(2));
    }

    #[test]
    fn test_out_of_range_rejected_without_mutation() {
        let mut tracker = CompletionTracker::new(2);
        let before = tracker.clone();

        let err = tracker
            .mark_complete(2, payload(json!({"x": true})))
            .unwrap_err();

        assert_eq!(
            err,
            WizardError::StepOutOfRange {
                index: 2,
                step_count: 2
            }
        );
        assert_eq!(tracker, before);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut tracker = CompletionTracker::new(2);
        tracker.mark_complete(0, payload(json!({"a": 1}))).unwrap();
        let snapshot = tracker.snapshot();

        tracker.mark_complete(1, payload(json!({"b": 2}))).unwrap();

        assert_eq!(Value::Object(snapshot), json!({"a": 1}));
        assert_eq!(tracker.completed_count(), 2);
    }
}
