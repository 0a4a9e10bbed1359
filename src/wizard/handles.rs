//! Capabilities handed to step content: signalling completion and cancelling
//! the run. Both hold a weak reference to the run so that a handle outliving
//! its controller can never mutate a torn-down run.

use crate::error::{Result, WizardError};
use crate::events::EventPublisher;
use crate::wizard::controller::RunCore;
use crate::wizard::tracker::StepPayload;
use std::fmt;
use std::sync::Weak;
use tracing::debug;
use uuid::Uuid;

/// What happened to a completion event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionDisposition {
    /// Recorded in the run's completion tracker
    Applied,
    /// The run had already ended (or was released); nothing was recorded
    Stale,
}

impl CompletionDisposition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// The `on_complete` capability of one step
#[derive(Clone)]
pub struct StepCompletionHandle {
    index: usize,
    run_id: Uuid,
    core: Weak<RunCore>,
    publisher: EventPublisher,
}

impl StepCompletionHandle {
    pub(crate) fn new(
        index: usize,
        run_id: Uuid,
        core: Weak<RunCore>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            index,
            run_id,
            core,
            publisher,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Report successful completion of the step with its result payload.
    ///
    /// Applied regardless of which step is currently active, so a late
    /// completion for a step the user navigated away from still counts.
    pub fn complete(&self, payload: StepPayload) -> Result<CompletionDisposition> {
        match self.core.upgrade() {
            Some(core) => core.complete_step(self.index, payload),
            None => {
                debug!(
                    run_id = %self.run_id,
                    step_index = self.index,
                    "Ignoring completion for released wizard run"
                );
                Ok(CompletionDisposition::Stale)
            }
        }
    }

    pub(crate) fn publisher(&self) -> &EventPublisher {
        &self.publisher
    }
}

impl fmt::Debug for StepCompletionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepCompletionHandle")
            .field("index", &self.index)
            .field("run_id", &self.run_id)
            .field("released", &(self.core.strong_count() == 0))
            .finish()
    }
}

/// The `on_cancel` capability, wired to the controller's `cancel()`
#[derive(Clone)]
pub struct CancellationHandle {
    run_id: Uuid,
    core: Weak<RunCore>,
}

impl CancellationHandle {
    pub(crate) fn new(run_id: Uuid, core: Weak<RunCore>) -> Self {
        Self { run_id, core }
    }

    pub fn cancel(&self) -> Result<()> {
        match self.core.upgrade() {
            Some(core) => core.cancel(),
            None => Err(WizardError::RunReleased {
                run_id: self.run_id,
            }),
        }
    }
}

impl fmt::Debug for CancellationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationHandle")
            .field("run_id", &self.run_id)
            .finish_non_exhaustive()
    }
}
