//! # Wizard Controller
//!
//! Orchestrates one wizard run: holds the active step position, applies the
//! optional/mandatory gating rule on navigation, records step completions
//! and fires the terminal callbacks.
//!
//! ## Usage
//!
//! ```rust
//! use serde_json::json;
//! use wizard_core::wizard::{StepSequence, WizardController};
//! use wizard_core::WizardPhase;
//!
//! # fn main() -> Result<(), wizard_core::WizardError> {
//! let steps = StepSequence::builder()
//!     .step("Create Repository")
//!     .optional_step("Import Data")
//!     .build()?;
//!
//! let controller = WizardController::builder(steps)
//!     .on_done(|state| println!("finished with {state:?}"))
//!     .start();
//!
//! let payload = json!({"repoId": "r1"}).as_object().cloned().unwrap_or_default();
//! controller.on_step_complete(0, payload)?;
//! controller.advance()?;
//! assert_eq!(controller.advance()?, WizardPhase::Done);
//! # Ok(())
//! # }
//! ```

use crate::config::WizardConfig;
use crate::error::{Result, WizardError};
use crate::events::{EventPublisher, PublishedEvent, WizardEvent};
use crate::logging::{log_step_operation, log_wizard_operation};
use crate::state_machine::errors::StateMachineError;
use crate::state_machine::events::NavigationEvent;
use crate::state_machine::guards::GuardContext;
use crate::state_machine::states::WizardPhase;
use crate::state_machine::wizard_state_machine::WizardStateMachine;
use crate::wizard::handles::{CancellationHandle, CompletionDisposition, StepCompletionHandle};
use crate::wizard::step::{StepContext, StepDefinition, StepSequence};
use crate::wizard::tracker::{AccumulatedState, CompletionTracker, StepPayload};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

/// Invoked once with the final accumulated state when the run reaches `Done`
pub type DoneCallback = Box<dyn FnOnce(AccumulatedState) + Send>;

/// Invoked once when the run is cancelled
pub type CancelCallback = Box<dyn FnOnce() + Send>;

/// Completed/total step counts for progress display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WizardProgress {
    pub completed: usize,
    pub total: usize,
    pub phase: WizardPhase,
}

/// Handle to a running wizard. Cloning yields another handle to the same run.
#[derive(Clone)]
pub struct WizardController {
    core: Arc<RunCore>,
}

/// Builder for a wizard run
pub struct WizardControllerBuilder {
    steps: StepSequence,
    show_back: bool,
    publisher: Option<EventPublisher>,
    on_done: Option<DoneCallback>,
    on_cancel: Option<CancelCallback>,
}

impl WizardControllerBuilder {
    fn new(steps: StepSequence) -> Self {
        Self {
            steps,
            show_back: false,
            publisher: None,
            on_done: None,
            on_cancel: None,
        }
    }

    /// Apply navigation flags and channel sizing from configuration
    pub fn config(mut self, config: &WizardConfig) -> Self {
        self.show_back = config.show_back;
        if self.publisher.is_none() {
            self.publisher = Some(EventPublisher::new(config.event_channel_capacity));
        }
        self
    }

    /// Enable or disable backward navigation
    pub fn show_back(mut self, show_back: bool) -> Self {
        self.show_back = show_back;
        self
    }

    /// Publish notifications through an existing publisher
    pub fn publisher(mut self, publisher: EventPublisher) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn on_done<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(AccumulatedState) + Send + 'static,
    {
        self.on_done = Some(Box::new(callback));
        self
    }

    pub fn on_cancel<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_cancel = Some(Box::new(callback));
        self
    }

    /// Start the run: the first step becomes active
    pub fn start(self) -> WizardController {
        let step_count = self.steps.len();
        let core = Arc::new(RunCore {
            run_id: Uuid::new_v4(),
            show_back: self.show_back,
            publisher: self.publisher.unwrap_or_default(),
            state: Mutex::new(RunState {
                machine: WizardStateMachine::new(step_count),
                tracker: Some(CompletionTracker::new(step_count)),
                on_done: self.on_done,
                on_cancel: self.on_cancel,
            }),
            steps: self.steps,
        });

        log_wizard_operation(
            "start",
            core.run_id,
            "step_0",
            Some(&format!("{step_count} steps, show_back={}", core.show_back)),
        );

        core.publish(WizardEvent::RunStarted { step_count });
        core.activate(0);

        WizardController { core }
    }
}

impl WizardController {
    pub fn builder(steps: StepSequence) -> WizardControllerBuilder {
        WizardControllerBuilder::new(steps)
    }

    pub fn run_id(&self) -> Uuid {
        self.core.run_id
    }

    pub fn steps(&self) -> &StepSequence {
        &self.core.steps
    }

    pub fn phase(&self) -> WizardPhase {
        self.core.state.lock().machine.current_phase()
    }

    /// Index of the active step; `None` once the run has ended
    pub fn current_index(&self) -> Option<usize> {
        self.phase().step_index()
    }

    pub fn current_step(&self) -> Option<&StepDefinition> {
        self.current_index().and_then(|index| self.core.steps.get(index))
    }

    /// Whether the step at `index` has completed in this run.
    ///
    /// Always false once the run has ended and its tracker was released.
    pub fn is_complete(&self, index: usize) -> bool {
        self.core
            .state
            .lock()
            .tracker
            .as_ref()
            .is_some_and(|tracker| tracker.is_complete(index))
    }

    /// Whether `advance()` would currently be accepted
    pub fn can_advance(&self) -> bool {
        let state = self.core.state.lock();
        let Some(tracker) = state.tracker.as_ref() else {
            return false;
        };
        let mut probe = state.machine.clone();
        probe
            .transition(NavigationEvent::Advance, &self.core.guard_context(tracker))
            .is_ok()
    }

    pub fn progress(&self) -> WizardProgress {
        let state = self.core.state.lock();
        WizardProgress {
            completed: state
                .tracker
                .as_ref()
                .map_or(0, CompletionTracker::completed_count),
            total: state.machine.step_count(),
            phase: state.machine.current_phase(),
        }
    }

    /// Copy of the accumulated state; `None` once the run has ended
    pub fn snapshot(&self) -> Option<AccumulatedState> {
        self.core
            .state
            .lock()
            .tracker
            .as_ref()
            .map(CompletionTracker::snapshot)
    }

    /// Move past the active step.
    ///
    /// Rejected while the active step is mandatory and incomplete. Advancing
    /// past the final step ends the run and fires the done callback.
    pub fn advance(&self) -> Result<WizardPhase> {
        self.core.advance()
    }

    /// Move back one step when backward navigation is enabled.
    ///
    /// Completion already recorded for any step is kept.
    pub fn go_back(&self) -> Result<WizardPhase> {
        self.core.go_back()
    }

    /// Cancel the run, discarding accumulated state.
    ///
    /// Safe while a step action is in flight; its eventual completion is stale.
    pub fn cancel(&self) -> Result<()> {
        self.core.cancel()
    }

    /// Record that the step at `index` completed with `payload`
    pub fn on_step_complete(
        &self,
        index: usize,
        payload: StepPayload,
    ) -> Result<CompletionDisposition> {
        self.core.complete_step(index, payload)
    }

    /// Completion capability for the step at `index`
    pub fn completion_handle(&self, index: usize) -> Result<StepCompletionHandle> {
        if index >= self.core.steps.len() {
            return Err(WizardError::StepOutOfRange {
                index,
                step_count: self.core.steps.len(),
            });
        }
        Ok(self.core.completion_handle(index))
    }

    pub fn cancellation_handle(&self) -> CancellationHandle {
        CancellationHandle::new(self.core.run_id, Arc::downgrade(&self.core))
    }

    pub fn publisher(&self) -> &EventPublisher {
        &self.core.publisher
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.core.publisher.subscribe()
    }
}

impl std::fmt::Debug for WizardController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardController")
            .field("run_id", &self.core.run_id)
            .field("phase", &self.phase())
            .field("steps", &self.core.steps.len())
            .finish()
    }
}

/// Shared state of one run, referenced strongly by controllers and weakly by handles
pub(crate) struct RunCore {
    run_id: Uuid,
    steps: StepSequence,
    show_back: bool,
    publisher: EventPublisher,
    state: Mutex<RunState>,
}

struct RunState {
    machine: WizardStateMachine,
    /// `None` once the run has ended
    tracker: Option<CompletionTracker>,
    on_done: Option<DoneCallback>,
    on_cancel: Option<CancelCallback>,
}

/// Side effects of a transition, run after the state lock is released
enum Followup {
    Activate(usize),
    Finish(AccumulatedState, Option<DoneCallback>),
}

impl RunCore {
    fn guard_context<'a>(&'a self, tracker: &'a CompletionTracker) -> GuardContext<'a> {
        GuardContext {
            steps: &self.steps,
            tracker,
            show_back: self.show_back,
        }
    }

    fn publish(&self, event: WizardEvent) {
        self.publisher.publish(self.run_id, event);
    }

    fn completion_handle(self: &Arc<Self>, index: usize) -> StepCompletionHandle {
        StepCompletionHandle::new(
            index,
            self.run_id,
            Arc::downgrade(self),
            self.publisher.clone(),
        )
    }

    /// Apply a navigation event under the lock, returning the phase before and after
    fn navigate(
        &self,
        state: &mut RunState,
        event: NavigationEvent,
    ) -> Result<(WizardPhase, WizardPhase)> {
        let from = state.machine.current_phase();
        let Some(tracker) = state.tracker.as_ref() else {
            return Err(StateMachineError::RunTerminated { phase: from }.into());
        };

        let context = self.guard_context(tracker);
        match state.machine.transition(event, &context) {
            Ok(to) => Ok((from, to)),
            Err(err) => {
                debug!(
                    run_id = %self.run_id,
                    event = event.event_type(),
                    phase = %from,
                    error = %err,
                    "Navigation rejected"
                );
                Err(err.into())
            }
        }
    }

    fn advance(self: &Arc<Self>) -> Result<WizardPhase> {
        let (from, to, followup) = {
            let mut state = self.state.lock();
            let (from, to) = self.navigate(&mut state, NavigationEvent::Advance)?;

            let followup = match to {
                WizardPhase::Step(index) => Followup::Activate(index),
                _ => {
                    let final_state = state
                        .tracker
                        .take()
                        .map(CompletionTracker::into_state)
                        .unwrap_or_default();
                    Followup::Finish(final_state, state.on_done.take())
                }
            };
            (from, to, followup)
        };

        self.publish(WizardEvent::Advanced {
            from: from.step_index().unwrap_or_default(),
            to,
        });

        match followup {
            Followup::Activate(index) => {
                info!(run_id = %self.run_id, from = %from, to = %to, "Wizard advanced");
                self.activate(index);
            }
            Followup::Finish(final_state, callback) => {
                log_wizard_operation(
                    "done",
                    self.run_id,
                    "done",
                    Some(&format!("{} accumulated keys", final_state.len())),
                );
                self.publish(WizardEvent::RunDone);
                if let Some(callback) = callback {
                    callback(final_state);
                }
            }
        }

        Ok(to)
    }

    fn go_back(self: &Arc<Self>) -> Result<WizardPhase> {
        let (from, to) = {
            let mut state = self.state.lock();
            self.navigate(&mut state, NavigationEvent::GoBack)?
        };

        let (Some(from_index), Some(to_index)) = (from.step_index(), to.step_index()) else {
            return Ok(to);
        };

        info!(run_id = %self.run_id, from = from_index, to = to_index, "Wizard went back");
        self.publish(WizardEvent::WentBack {
            from: from_index,
            to: to_index,
        });
        self.activate(to_index);

        Ok(to)
    }

    pub(crate) fn cancel(&self) -> Result<()> {
        let (from, callback) = {
            let mut state = self.state.lock();
            let (from, _) = self.navigate(&mut state, NavigationEvent::Cancel)?;
            state.tracker = None;
            (from, state.on_cancel.take())
        };

        let from_index = from.step_index().unwrap_or_default();
        log_wizard_operation(
            "cancel",
            self.run_id,
            "cancelled",
            Some(&format!("cancelled at step {from_index}")),
        );
        self.publish(WizardEvent::RunCancelled { from: from_index });

        if let Some(callback) = callback {
            callback();
        }

        Ok(())
    }

    pub(crate) fn complete_step(
        &self,
        index: usize,
        payload: StepPayload,
    ) -> Result<CompletionDisposition> {
        {
            let mut state = self.state.lock();
            let phase = state.machine.current_phase();
            let Some(tracker) = state.tracker.as_mut() else {
                debug!(
                    run_id = %self.run_id,
                    step_index = index,
                    phase = %phase,
                    "Ignoring stale step completion"
                );
                return Ok(CompletionDisposition::Stale);
            };
            tracker.mark_complete(index, payload)?;
        }

        let label = self.steps.get(index).map(StepDefinition::label);
        log_step_operation("complete", self.run_id, Some(index), label, "completed", None);
        self.publish(WizardEvent::StepCompleted { step_index: index });

        Ok(CompletionDisposition::Applied)
    }

    /// Make the step at `index` the visible one and hand its content the step capabilities
    fn activate(self: &Arc<Self>, index: usize) {
        let Some(step) = self.steps.get(index) else {
            return;
        };

        debug!(
            run_id = %self.run_id,
            step_index = index,
            step_label = step.label(),
            optional = step.is_optional(),
            "Activating step"
        );
        self.publish(WizardEvent::StepActivated {
            step_index: index,
            label: step.label().to_string(),
        });

        if let Some(content) = step.content() {
            content.activate(StepContext {
                index,
                label: step.label().to_string(),
                completion: self.completion_handle(index),
                cancellation: CancellationHandle::new(self.run_id, Arc::downgrade(self)),
            });
        }
    }
}
