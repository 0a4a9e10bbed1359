use super::{
    errors::{invalid_transition, StateMachineResult},
    events::ActionEvent,
    states::ActionState,
};

/// In-memory state machine for one step's fallible async action.
///
/// Holds the current [`ActionState`] and the reason of the most recent
/// failure. The reason is cleared when the action is retried or reset.
#[derive(Debug, Clone, Default)]
pub struct ActionStateMachine {
    state: ActionState,
    failure_reason: Option<String>,
}

impl ActionStateMachine {
    /// Create a new action state machine in `NotStarted`
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state of the action
    pub fn current_state(&self) -> ActionState {
        self.state
    }

    /// Reason of the last failure, retained until the next retry or reset
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Attempt to transition the action state, returning the new state
    pub fn transition(&mut self, event: ActionEvent) -> StateMachineResult<ActionState> {
        let target = Self::determine_target_state(self.state, &event)?;

        if event != ActionEvent::Complete {
            self.failure_reason = event.error_message().map(str::to_string);
        }

        self.state = target;
        Ok(target)
    }

    /// Event that would begin an invocation from the current state, if any
    pub fn invocation_event(&self) -> Option<ActionEvent> {
        match self.state {
            ActionState::NotStarted => Some(ActionEvent::Start),
            ActionState::Failed => Some(ActionEvent::Retry),
            ActionState::InProgress | ActionState::Completed => None,
        }
    }

    /// Determine the target state based on current state and event
    pub fn determine_target_state(
        current_state: ActionState,
        event: &ActionEvent,
    ) -> StateMachineResult<ActionState> {
        let target = match (current_state, event) {
            (ActionState::NotStarted, ActionEvent::Start) => ActionState::InProgress,

            // Retry goes straight back into flight
            (ActionState::Failed, ActionEvent::Retry) => ActionState::InProgress,

            (ActionState::InProgress, ActionEvent::Complete) => ActionState::Completed,
            (ActionState::InProgress, ActionEvent::Fail(_)) => ActionState::Failed,

            (ActionState::Failed, ActionEvent::Reset) => ActionState::NotStarted,

            (from_state, event) => {
                return Err(invalid_transition(from_state, event.event_type()));
            }
        };

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::errors::StateMachineError;

    #[test]
    fn test_action_state_transitions() {
        assert_eq!(
            ActionStateMachine::determine_target_state(ActionState::NotStarted, &ActionEvent::Start)
                .unwrap(),
            ActionState::InProgress
        );
        assert_eq!(
            ActionStateMachine::determine_target_state(
                ActionState::InProgress,
                &ActionEvent::Complete
            )
            .unwrap(),
            ActionState::Completed
        );
        assert_eq!(
            ActionStateMachine::determine_target_state(
                ActionState::InProgress,
                &ActionEvent::fail_with_error("boom")
            )
            .unwrap(),
            ActionState::Failed
        );
        assert_eq!(
            ActionStateMachine::determine_target_state(ActionState::Failed, &ActionEvent::Retry)
                .unwrap(),
            ActionState::InProgress
        );
        assert_eq!(
            ActionStateMachine::determine_target_state(ActionState::Failed, &ActionEvent::Reset)
                .unwrap(),
            ActionState::NotStarted
        );
    }

    #[test]
    fn test_action_invalid_transitions() {
        // Completed is terminal
        assert!(
            ActionStateMachine::determine_target_state(ActionState::Completed, &ActionEvent::Start)
                .is_err()
        );
        assert!(
            ActionStateMachine::determine_target_state(ActionState::Completed, &ActionEvent::Retry)
                .is_err()
        );

        // No double start while in flight
        let err =
            ActionStateMachine::determine_target_state(ActionState::InProgress, &ActionEvent::Start)
                .unwrap_err();
        assert!(matches!(err, StateMachineError::InvalidTransition { .. }));

        // Retry only from failed
        assert!(ActionStateMachine::determine_target_state(
            ActionState::NotStarted,
            &ActionEvent::Retry
        )
        .is_err());
    }

    #[test]
    fn test_failure_reason_retained_until_retry() {
        let mut machine = ActionStateMachine::new();
        machine.transition(ActionEvent::Start).unwrap();
        machine
            .transition(ActionEvent::fail_with_error("name taken"))
            .unwrap();

        assert_eq!(machine.current_state(), ActionState::Failed);
        assert_eq!(machine.failure_reason(), Some("name taken"));
        assert_eq!(machine.invocation_event(), Some(ActionEvent::Retry));

        machine.transition(ActionEvent::Retry).unwrap();
        assert_eq!(machine.current_state(), ActionState::InProgress);
        assert_eq!(machine.failure_reason(), None);
        assert_eq!(machine.invocation_event(), None);
    }

    #[test]
    fn test_rejected_transition_leaves_state_untouched() {
        let mut machine = ActionStateMachine::new();
        assert!(machine.transition(ActionEvent::Complete).is_err());
        assert_eq!(machine.current_state(), ActionState::NotStarted);
    }
}
