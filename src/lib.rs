#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Wizard Core
//!
//! Orchestration core for guided multi-step setup flows.
//!
//! ## Overview
//!
//! A user is walked through a fixed, ordered sequence of steps. Some steps
//! are mandatory, some optional. Each step may perform an asynchronous action
//! (creating a resource, importing data, submitting a configuration) and
//! reports a result payload back to the run. The core tracks which steps are
//! done, gates navigation on mandatory steps, merges the payloads into an
//! accumulated state and hands that state to a terminal callback.
//!
//! Rendering, the concrete business actions, routing after the flow ends and
//! persistence are collaborators outside this crate.
//!
//! ## Module Organization
//!
//! - [`wizard`] - Step definitions, completion tracking, the run controller and the action runner
//! - [`state_machine`] - Pure state machines for step actions and wizard navigation
//! - [`events`] - Explicit state-change notifications
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use wizard_core::wizard::{FnAction, StepActionRunner, StepPayload, StepSequence, WizardController};
//! use wizard_core::{ActionState, WizardPhase};
//!
//! # tokio_test::block_on(async {
//! let steps = StepSequence::builder()
//!     .step("Create Repository")
//!     .optional_step("Import Data")
//!     .step("Spark Configurations")
//!     .build()
//!     .unwrap();
//!
//! let controller = WizardController::builder(steps)
//!     .on_done(|state| println!("wizard finished: {state:?}"))
//!     .start();
//!
//! let create = FnAction::new("create repository", |name: String| async move {
//!     let payload = json!({"repoId": name, "branch": "main"});
//!     Ok::<_, anyhow::Error>(payload.as_object().cloned().unwrap_or_default())
//! });
//! let runner = StepActionRunner::new(create, controller.completion_handle(0).unwrap());
//!
//! runner.invoke("my-repo".to_string()).await.unwrap();
//! assert_eq!(runner.state(), ActionState::Completed);
//!
//! controller.advance().unwrap(); // Create -> Import
//! controller.advance().unwrap(); // Import is optional
//! assert!(controller.advance().is_err()); // Spark Configurations is mandatory
//!
//! controller.on_step_complete(2, StepPayload::new()).unwrap();
//! assert_eq!(controller.advance().unwrap(), WizardPhase::Done);
//! # });
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod state_machine;
pub mod wizard;

pub use crate::config::{StepConfig, WizardConfig};
pub use error::{Result, WizardError};
pub use events::{EventPublisher, PublishedEvent, WizardEvent};
pub use state_machine::{ActionState, WizardPhase};
pub use wizard::{
    ActionOutcome, CompletionDisposition, CompletionTracker, StepAction, StepActionRunner,
    StepDefinition, StepSequence, WizardController,
};
