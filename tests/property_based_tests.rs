mod common;

use common::strategies::*;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wizard_core::wizard::{AccumulatedState, StepPayload, WizardController};
use wizard_core::{CompletionTracker, WizardPhase};

proptest! {
    /// Property: completing every step in order and advancing after each reaches Done exactly once
    #[test]
    fn completed_steps_always_reach_done(layout in step_layout_strategy()) {
        let done_calls = Arc::new(AtomicUsize::new(0));
        let controller = WizardController::builder(sequence_from_layout(&layout))
            .on_done({
                let done_calls = Arc::clone(&done_calls);
                move |_| {
                    done_calls.fetch_add(1, Ordering::SeqCst);
                }
            })
            .start();

        for index in 0..layout.len() {
            prop_assert_eq!(controller.current_index(), Some(index));
            controller.on_step_complete(index, StepPayload::new()).unwrap();
            controller.advance().unwrap();
        }

        prop_assert_eq!(controller.phase(), WizardPhase::Done);
        prop_assert!(controller.advance().is_err());
        prop_assert_eq!(done_calls.load(Ordering::SeqCst), 1);
    }

    /// Property: advance succeeds exactly when the active step is optional or complete
    #[test]
    fn advance_is_gated_only_by_incomplete_mandatory_steps(layout in step_layout_strategy()) {
        let controller = WizardController::builder(sequence_from_layout(&layout)).start();

        for (index, optional) in layout.iter().enumerate() {
            prop_assert_eq!(controller.can_advance(), *optional);
            if !optional {
                prop_assert!(controller.advance().is_err());
                prop_assert_eq!(controller.current_index(), Some(index));
                controller.on_step_complete(index, StepPayload::new()).unwrap();
            }
            controller.advance().unwrap();
        }

        prop_assert_eq!(controller.phase(), WizardPhase::Done);
    }

    /// Property: completed count never decreases and out-of-range indices never mutate the tracker
    #[test]
    fn completed_count_is_monotonic(
        step_count in 1usize..8,
        indices in prop::collection::vec(0usize..12, 0..24),
    ) {
        let mut tracker = CompletionTracker::new(step_count);
        let mut previous = 0;

        for index in indices {
            let before = tracker.clone();
            let result = tracker.mark_complete(index, StepPayload::new());
            if index < step_count {
                prop_assert!(result.is_ok());
                prop_assert!(tracker.is_complete(index));
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(&tracker, &before);
            }
            prop_assert!(tracker.completed_count() >= previous);
            previous = tracker.completed_count();
        }
    }

    /// Property: the accumulated state is the in-order merge of every payload, later keys winning
    #[test]
    fn accumulated_state_is_last_writer_wins(
        completions in prop::collection::vec((0usize..4, payload_strategy()), 0..12),
    ) {
        let mut tracker = CompletionTracker::new(4);
        let mut expected = AccumulatedState::new();

        for (index, payload) in completions {
            expected.extend(payload.clone());
            tracker.mark_complete(index, payload).unwrap();
        }

        prop_assert_eq!(tracker.snapshot(), expected);
    }

    /// Property: re-marking a step with the same payload changes nothing
    #[test]
    fn mark_complete_is_idempotent(index in 0usize..4, payload in payload_strategy()) {
        let mut tracker = CompletionTracker::new(4);
        tracker.mark_complete(index, payload.clone()).unwrap();
        let once = tracker.clone();

        tracker.mark_complete(index, payload).unwrap();
        prop_assert_eq!(tracker, once);
    }
}
