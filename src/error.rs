use crate::state_machine::errors::StateMachineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid step sequence: {0}")]
    InvalidSequence(String),
    #[error("Step index {index} is out of range for a {step_count}-step wizard")]
    StepOutOfRange { index: usize, step_count: usize },
    #[error("State machine error: {0}")]
    StateMachine(#[from] StateMachineError),
    #[error("Action for step {index} is already in progress")]
    ActionInFlight { index: usize },
    #[error("Action for step {index} has already completed")]
    ActionAlreadyCompleted { index: usize },
    #[error("Wizard run {run_id} has been released")]
    RunReleased { run_id: uuid::Uuid },
}

impl From<::config::ConfigError> for WizardError {
    fn from(error: ::config::ConfigError) -> Self {
        WizardError::Configuration(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WizardError>;
