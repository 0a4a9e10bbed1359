//! # Step Action Runner
//!
//! Wraps a step's fallible asynchronous action. Invocations are serialized
//! (a second `invoke` while one is in flight is rejected), the outcome is
//! mapped onto [`ActionState`], and a successful result is forwarded to the
//! wizard as the step's completion.

use crate::error::{Result, WizardError};
use crate::events::WizardEvent;
use crate::state_machine::action_state_machine::ActionStateMachine;
use crate::state_machine::events::ActionEvent;
use crate::state_machine::states::ActionState;
use crate::wizard::handles::{CompletionDisposition, StepCompletionHandle};
use crate::wizard::tracker::StepPayload;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Failure reason recorded when an invocation is dropped before it resolves
pub const ABANDONED_REASON: &str = "invocation abandoned before resolving";

/// An opaque asynchronous operation performed by a step, such as creating a
/// repository. The runner never inspects it beyond its outcome.
#[async_trait]
pub trait StepAction: Send + Sync {
    type Input: Send + 'static;

    /// Perform the action, producing the step's result payload
    async fn perform(&self, input: Self::Input) -> anyhow::Result<StepPayload>;

    /// Get a description of this action for logging
    fn description(&self) -> &'static str {
        "step action"
    }
}

/// Adapts an async closure into a [`StepAction`].
///
/// Collaborators the action needs (an API client, a storage handle) are
/// captured by the closure rather than reached ambiently.
pub struct FnAction<I, F> {
    f: F,
    description: &'static str,
    _input: PhantomData<fn(I)>,
}

impl<I, F> FnAction<I, F> {
    pub fn new<Fut>(description: &'static str, f: F) -> Self
    where
        F: Fn(I) -> Fut,
        Fut: Future<Output = anyhow::Result<StepPayload>>,
    {
        Self {
            f,
            description,
            _input: PhantomData,
        }
    }
}

#[async_trait]
impl<I, F, Fut> StepAction for FnAction<I, F>
where
    I: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<StepPayload>> + Send + 'static,
{
    type Input = I;

    async fn perform(&self, input: I) -> anyhow::Result<StepPayload> {
        (self.f)(input).await
    }

    fn description(&self) -> &'static str {
        self.description
    }
}

/// Result of one accepted invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action succeeded and its payload was forwarded to the wizard
    Completed(CompletionDisposition),
    /// The action failed; nothing was forwarded
    Failed { reason: String },
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } => Some(reason),
            Self::Completed(_) => None,
        }
    }
}

/// Runs one step's action and owns that step's [`ActionState`].
///
/// Create one when the step becomes active; cloning shares the same state.
pub struct StepActionRunner<A: StepAction> {
    action: Arc<A>,
    machine: Arc<Mutex<ActionStateMachine>>,
    completion: StepCompletionHandle,
}

impl<A: StepAction> Clone for StepActionRunner<A> {
    fn clone(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
            machine: Arc::clone(&self.machine),
            completion: self.completion.clone(),
        }
    }
}

impl<A: StepAction> StepActionRunner<A> {
    pub fn new(action: A, completion: StepCompletionHandle) -> Self {
        Self::from_arc(Arc::new(action), completion)
    }

    pub fn from_arc(action: Arc<A>, completion: StepCompletionHandle) -> Self {
        Self {
            action,
            machine: Arc::new(Mutex::new(ActionStateMachine::new())),
            completion,
        }
    }

    pub fn step_index(&self) -> usize {
        self.completion.index()
    }

    pub fn state(&self) -> ActionState {
        self.machine.lock().current_state()
    }

    /// Reason of the last failure, for display next to a retry affordance
    pub fn failure_reason(&self) -> Option<String> {
        self.machine.lock().failure_reason().map(str::to_string)
    }

    /// Invoke the action with `input`.
    ///
    /// Accepted from `NotStarted` and, as a retry, from `Failed`. Rejected
    /// with [`WizardError::ActionInFlight`] while an invocation is pending and
    /// with [`WizardError::ActionAlreadyCompleted`] after success; a rejected
    /// call never reaches the action.
    pub async fn invoke(&self, input: A::Input) -> Result<ActionOutcome> {
        let index = self.step_index();
        let from = {
            let mut machine = self.machine.lock();
            let from = machine.current_state();
            let Some(event) = machine.invocation_event() else {
                debug!(
                    run_id = %self.completion.run_id(),
                    step_index = index,
                    state = %from,
                    "Rejecting step action invocation"
                );
                return Err(match from {
                    ActionState::Completed => WizardError::ActionAlreadyCompleted { index },
                    _ => WizardError::ActionInFlight { index },
                });
            };
            machine.transition(event)?;
            from
        };
        self.notify(from, ActionState::InProgress);
        let mut in_flight = InFlightGuard::new(self);

        info!(
            run_id = %self.completion.run_id(),
            step_index = index,
            action = self.action.description(),
            retry = from.is_error(),
            "Invoking step action"
        );

        match self.action.perform(input).await {
            Ok(payload) => {
                in_flight.disarm();
                self.settle(ActionEvent::Complete)?;
                let disposition = self.completion.complete(payload)?;
                debug!(
                    run_id = %self.completion.run_id(),
                    step_index = index,
                    applied = disposition.is_applied(),
                    "Step action completed"
                );
                Ok(ActionOutcome::Completed(disposition))
            }
            Err(error) => {
                in_flight.disarm();
                let reason = format!("{error:#}");
                warn!(
                    run_id = %self.completion.run_id(),
                    step_index = index,
                    action = self.action.description(),
                    reason = %reason,
                    "Step action failed"
                );
                self.settle(ActionEvent::fail_with_error(reason.clone()))?;
                Ok(ActionOutcome::Failed { reason })
            }
        }
    }

    /// Return a failed action to `NotStarted`, clearing its failure reason
    pub fn reset(&self) -> Result<ActionState> {
        let (from, to) = {
            let mut machine = self.machine.lock();
            let from = machine.current_state();
            (from, machine.transition(ActionEvent::Reset)?)
        };
        self.notify(from, to);
        Ok(to)
    }

    /// Fail an invocation whose future was dropped before the action resolved
    fn abandon(&self) {
        {
            let mut machine = self.machine.lock();
            if machine.current_state() != ActionState::InProgress {
                return;
            }
            if let Err(err) = machine.transition(ActionEvent::fail_with_error(ABANDONED_REASON)) {
                warn!(error = %err, "Could not settle abandoned step action");
                return;
            }
        }
        warn!(
            run_id = %self.completion.run_id(),
            step_index = self.step_index(),
            action = self.action.description(),
            "Step action invocation dropped before resolving"
        );
        self.notify(ActionState::InProgress, ActionState::Failed);
    }

    fn settle(&self, event: ActionEvent) -> Result<()> {
        let to = self.machine.lock().transition(event)?;
        self.notify(ActionState::InProgress, to);
        Ok(())
    }

    fn notify(&self, from: ActionState, to: ActionState) {
        debug!(
            run_id = %self.completion.run_id(),
            step_index = self.step_index(),
            from = %from,
            to = %to,
            "Step action state changed"
        );
        self.completion.publisher().publish(
            self.completion.run_id(),
            WizardEvent::ActionStateChanged {
                step_index: self.step_index(),
                from,
                to,
            },
        );
    }
}

/// Settles the runner as `Failed` if `invoke` is dropped mid-flight, e.g. by
/// a timeout or an aborted task.
struct InFlightGuard<'a, A: StepAction> {
    runner: &'a StepActionRunner<A>,
    armed: bool,
}

impl<'a, A: StepAction> InFlightGuard<'a, A> {
    fn new(runner: &'a StepActionRunner<A>) -> Self {
        Self {
            runner,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl<A: StepAction> Drop for InFlightGuard<'_, A> {
    fn drop(&mut self) {
        if self.armed {
            self.runner.abandon();
        }
    }
}
