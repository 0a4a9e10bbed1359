use super::states::WizardPhase;
use thiserror::Error;

/// Error types for state machine operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateMachineError {
    #[error("Guard condition failed: {0}")]
    GuardFailed(#[from] GuardError),

    #[error("Invalid state transition from {from} on {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Wizard run already ended ({phase})")]
    RunTerminated { phase: WizardPhase },
}

/// Specific error type for guard condition failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Step {index} ({label}) is mandatory and has not been completed")]
    StepIncomplete { index: usize, label: String },

    #[error("Backward navigation is disabled for this wizard")]
    BackNavigationDisabled,
}

/// Result type alias for state machine operations
pub type StateMachineResult<T> = Result<T, StateMachineError>;
pub type GuardResult<T> = Result<T, GuardError>;

/// Helper function to create invalid transition errors
pub fn invalid_transition(from: impl ToString, event: impl Into<String>) -> StateMachineError {
    StateMachineError::InvalidTransition {
        from: from.to_string(),
        event: event.into(),
    }
}

/// Helper function to create mandatory step guard errors
pub fn step_incomplete(index: usize, label: impl Into<String>) -> GuardError {
    GuardError::StepIncomplete {
        index,
        label: label.into(),
    }
}
