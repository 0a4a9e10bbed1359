//! # Wizard Orchestration
//!
//! Step definitions, completion tracking, the run controller and the runner
//! for steps whose content performs a fallible async action.

pub mod controller;
pub mod handles;
pub mod runner;
pub mod step;
pub mod tracker;

pub use controller::{
    CancelCallback, DoneCallback, WizardController, WizardControllerBuilder, WizardProgress,
};
pub use handles::{CancellationHandle, CompletionDisposition, StepCompletionHandle};
pub use runner::{ActionOutcome, FnAction, StepAction, StepActionRunner, ABANDONED_REASON};
pub use step::{StepContent, StepContext, StepDefinition, StepSequence, StepSequenceBuilder};
pub use tracker::{AccumulatedState, CompletionTracker, StepPayload};
