use serde::{Deserialize, Serialize};

/// Events that drive a step action through its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ActionEvent {
    /// First invocation of the action
    Start,
    /// Re-invocation after a failure
    Retry,
    /// The action resolved successfully
    Complete,
    /// The action rejected with a reason
    Fail(String),
    /// Return a failed action to its initial state without invoking it
    Reset,
}

impl ActionEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Retry => "retry",
            Self::Complete => "complete",
            Self::Fail(_) => "fail",
            Self::Reset => "reset",
        }
    }

    /// Extract the failure reason if this is a failure event
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Fail(reason) => Some(reason),
            _ => None,
        }
    }

    /// Create a failure event with the given reason
    pub fn fail_with_error(reason: impl Into<String>) -> Self {
        Self::Fail(reason.into())
    }
}

/// Navigation intents understood by the wizard state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationEvent {
    Advance,
    GoBack,
    Cancel,
}

impl NavigationEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Advance => "advance",
            Self::GoBack => "go_back",
            Self::Cancel => "cancel",
        }
    }
}
