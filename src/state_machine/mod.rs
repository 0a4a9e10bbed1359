// State machine module for wizard orchestration
//
// Two pure state machines: one per step action (not started -> in progress ->
// completed/failed, with retry) and one per wizard run (step position plus the
// done/cancelled terminals). Side effects live in the `wizard` module.

pub mod action_state_machine;
pub mod errors;
pub mod events;
pub mod guards;
pub mod states;
pub mod wizard_state_machine;

// Re-export main types for convenient access
pub use action_state_machine::ActionStateMachine;
pub use errors::{GuardError, StateMachineError};
pub use events::{ActionEvent, NavigationEvent};
pub use states::{ActionState, WizardPhase};
pub use wizard_state_machine::WizardStateMachine;

// Common traits and utilities
pub use guards::{GuardContext, StateGuard};
