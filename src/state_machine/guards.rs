use super::errors::{step_incomplete, GuardError, GuardResult};
use super::states::WizardPhase;
use crate::wizard::step::StepSequence;
use crate::wizard::tracker::CompletionTracker;

/// Read-only view of the run that guards evaluate against
#[derive(Debug, Clone, Copy)]
pub struct GuardContext<'a> {
    pub steps: &'a StepSequence,
    pub tracker: &'a CompletionTracker,
    pub show_back: bool,
}

/// Trait for implementing navigation guards
pub trait StateGuard {
    /// Check if a transition out of `phase` is allowed
    fn check(&self, phase: WizardPhase, context: &GuardContext<'_>) -> GuardResult<()>;

    /// Get a description of this guard for logging
    fn description(&self) -> &'static str;
}

/// Guard that blocks advancing past a mandatory step until it has completed.
///
/// Optional steps never block, whether or not they completed.
pub struct CurrentStepSatisfiedGuard;

impl StateGuard for CurrentStepSatisfiedGuard {
    fn check(&self, phase: WizardPhase, context: &GuardContext<'_>) -> GuardResult<()> {
        let Some(index) = phase.step_index() else {
            return Ok(());
        };

        match context.steps.get(index) {
            Some(step) if step.is_optional() || context.tracker.is_complete(index) => Ok(()),
            Some(step) => Err(step_incomplete(index, step.label())),
            None => Err(step_incomplete(index, "<unknown>")),
        }
    }

    fn description(&self) -> &'static str {
        "Mandatory steps must be complete before advancing"
    }
}

/// Guard for the `show_back` configuration flag
pub struct BackNavigationEnabledGuard;

impl StateGuard for BackNavigationEnabledGuard {
    fn check(&self, _phase: WizardPhase, context: &GuardContext<'_>) -> GuardResult<()> {
        if context.show_back {
            Ok(())
        } else {
            Err(GuardError::BackNavigationDisabled)
        }
    }

    fn description(&self) -> &'static str {
        "Backward navigation must be enabled"
    }
}
