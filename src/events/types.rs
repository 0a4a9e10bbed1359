use crate::state_machine::states::{ActionState, WizardPhase};
use serde::{Deserialize, Serialize};

/// State-change notifications emitted by a wizard run.
///
/// Observers (a rendering layer, a test) subscribe through the
/// [`EventPublisher`](super::EventPublisher) instead of polling the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    RunStarted {
        step_count: usize,
    },
    StepActivated {
        step_index: usize,
        label: String,
    },
    StepCompleted {
        step_index: usize,
    },
    Advanced {
        from: usize,
        to: WizardPhase,
    },
    WentBack {
        from: usize,
        to: usize,
    },
    ActionStateChanged {
        step_index: usize,
        from: ActionState,
        to: ActionState,
    },
    RunDone,
    RunCancelled {
        from: usize,
    },
}

impl WizardEvent {
    /// Dotted event name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "wizard.run_started",
            Self::StepActivated { .. } => "wizard.step_activated",
            Self::StepCompleted { .. } => "wizard.step_completed",
            Self::Advanced { .. } => "wizard.advanced",
            Self::WentBack { .. } => "wizard.went_back",
            Self::ActionStateChanged { .. } => "step.action_state_changed",
            Self::RunDone => "wizard.run_done",
            Self::RunCancelled { .. } => "wizard.run_cancelled",
        }
    }

    /// Check if this event ends the run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RunDone | Self::RunCancelled { .. })
    }
}
