use super::{
    errors::{invalid_transition, StateMachineError, StateMachineResult},
    events::NavigationEvent,
    guards::{BackNavigationEnabledGuard, CurrentStepSatisfiedGuard, GuardContext, StateGuard},
    states::WizardPhase,
};

/// Step-sequencing state machine for one wizard run.
///
/// Pure bookkeeping: the controller feeds it navigation events together with
/// a [`GuardContext`] and performs the side effects (callbacks, events,
/// step activation) itself.
#[derive(Debug, Clone)]
pub struct WizardStateMachine {
    phase: WizardPhase,
    step_count: usize,
}

impl WizardStateMachine {
    /// Create a state machine positioned on the first step
    pub fn new(step_count: usize) -> Self {
        Self {
            phase: WizardPhase::Step(0),
            step_count,
        }
    }

    /// Get the current phase
    pub fn current_phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Attempt a navigation transition, returning the new phase.
    ///
    /// On error the phase is left unchanged.
    pub fn transition(
        &mut self,
        event: NavigationEvent,
        context: &GuardContext<'_>,
    ) -> StateMachineResult<WizardPhase> {
        if self.phase.is_terminal() {
            return Err(StateMachineError::RunTerminated { phase: self.phase });
        }

        // Guards first: a disabled back button is reported even on step 0
        self.check_guards(event, context)?;

        let target = Self::determine_target_phase(self.phase, event, self.step_count)?;
        self.phase = target;
        Ok(target)
    }

    /// Determine the target phase based on current phase and event
    pub fn determine_target_phase(
        current: WizardPhase,
        event: NavigationEvent,
        step_count: usize,
    ) -> StateMachineResult<WizardPhase> {
        let target = match (current, event) {
            (WizardPhase::Done | WizardPhase::Cancelled, _) => {
                return Err(StateMachineError::RunTerminated { phase: current });
            }

            (WizardPhase::Step(index), NavigationEvent::Advance) if index + 1 >= step_count => {
                WizardPhase::Done
            }
            (WizardPhase::Step(index), NavigationEvent::Advance) => WizardPhase::Step(index + 1),

            (WizardPhase::Step(index), NavigationEvent::GoBack) if index > 0 => {
                WizardPhase::Step(index - 1)
            }

            (WizardPhase::Step(_), NavigationEvent::Cancel) => WizardPhase::Cancelled,

            (from, event) => return Err(invalid_transition(from, event.event_type())),
        };

        Ok(target)
    }

    /// Check guard conditions for the transition
    fn check_guards(
        &self,
        event: NavigationEvent,
        context: &GuardContext<'_>,
    ) -> StateMachineResult<()> {
        match event {
            NavigationEvent::Advance => CurrentStepSatisfiedGuard.check(self.phase, context)?,
            NavigationEvent::GoBack => BackNavigationEnabledGuard.check(self.phase, context)?,
            NavigationEvent::Cancel => {}
        }

        Ok(())
    }
}
