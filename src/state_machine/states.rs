use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a single step's fallible async action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    /// Initial state when the step becomes active
    NotStarted,
    /// The action has been invoked and has not resolved yet
    InProgress,
    /// The action resolved successfully
    Completed,
    /// The action rejected; the failure reason is retained for display
    Failed,
}

impl ActionState {
    /// Check if this is a terminal state (no further invocation expected)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Check if this is an error state that allows a retry
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Check if the action is currently in flight
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Check if a new invocation would be accepted from this state
    pub fn accepts_invocation(&self) -> bool {
        matches!(self, Self::NotStarted | Self::Failed)
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for ActionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid action state: {s}")),
        }
    }
}

impl Default for ActionState {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Position of a wizard run: one state per active step index plus the two terminal states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "index")]
pub enum WizardPhase {
    /// The step at this index is active
    Step(usize),
    /// The final step was advanced past and the terminal callback fired
    Done,
    /// The run was cancelled
    Cancelled,
}

impl WizardPhase {
    /// Check if the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Index of the active step, if the run is still active
    pub fn step_index(&self) -> Option<usize> {
        match self {
            Self::Step(index) => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for WizardPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step(index) => write!(f, "step_{index}"),
            Self::Done => write!(f, "done"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl Default for WizardPhase {
    fn default() -> Self {
        Self::Step(0)
    }
}
