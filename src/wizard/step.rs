//! # Step Definitions
//!
//! Immutable description of the steps of a wizard run and the capability a
//! step's content implements to take part in it.

use crate::error::{Result, WizardError};
use crate::wizard::handles::{CancellationHandle, StepCompletionHandle};
use std::fmt;
use std::sync::Arc;

/// Content hosted by a step.
///
/// The controller calls [`activate`](StepContent::activate) each time the
/// step becomes the active one. The content signals success through the
/// completion handle in the [`StepContext`] (at most once per activation)
/// and may hook the cancellation handle up to its own cancel affordance.
pub trait StepContent: Send + Sync {
    fn activate(&self, context: StepContext);
}

/// Capabilities handed to a step's content when it becomes active
#[derive(Clone)]
pub struct StepContext {
    pub index: usize,
    pub label: String,
    pub completion: StepCompletionHandle,
    pub cancellation: CancellationHandle,
}

impl fmt::Debug for StepContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepContext")
            .field("index", &self.index)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// One step of the sequence. Identity is the step's index.
#[derive(Clone)]
pub struct StepDefinition {
    index: usize,
    label: String,
    optional: bool,
    content: Option<Arc<dyn StepContent>>,
}

impl StepDefinition {
    pub fn new(index: usize, label: impl Into<String>, optional: bool) -> Self {
        Self {
            index,
            label: label.into(),
            optional,
            content: None,
        }
    }

    /// Attach the content this step hosts
    pub fn with_content(mut self, content: Arc<dyn StepContent>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn content(&self) -> Option<&Arc<dyn StepContent>> {
        self.content.as_ref()
    }
}

impl PartialEq for StepDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for StepDefinition {}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("index", &self.index)
            .field("label", &self.label)
            .field("optional", &self.optional)
            .field("has_content", &self.content.is_some())
            .finish()
    }
}

/// Validated, immutable ordered sequence of steps
#[derive(Debug, Clone)]
pub struct StepSequence {
    steps: Vec<StepDefinition>,
}

impl StepSequence {
    /// Validate and wrap a list of step definitions.
    ///
    /// The list must be non-empty, indices must run contiguously from 0 in
    /// order, and labels must not be blank.
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self> {
        if steps.is_empty() {
            return Err(WizardError::InvalidSequence(
                "a wizard needs at least one step".to_string(),
            ));
        }

        for (position, step) in steps.iter().enumerate() {
            if step.index != position {
                return Err(WizardError::InvalidSequence(format!(
                    "step '{}' has index {} but sits at position {position}",
                    step.label, step.index
                )));
            }
            if step.label.trim().is_empty() {
                return Err(WizardError::InvalidSequence(format!(
                    "step {position} has a blank label"
                )));
            }
        }

        Ok(Self { steps })
    }

    pub fn builder() -> StepSequenceBuilder {
        StepSequenceBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for a validated sequence
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.steps.iter().map(StepDefinition::label).collect()
    }
}

/// Builder that assigns indices by position
#[derive(Default)]
pub struct StepSequenceBuilder {
    steps: Vec<StepDefinition>,
    orphan_content: bool,
}

impl StepSequenceBuilder {
    /// Append a mandatory step
    pub fn step(self, label: impl Into<String>) -> Self {
        self.push(label, false)
    }

    /// Append an optional step
    pub fn optional_step(self, label: impl Into<String>) -> Self {
        self.push(label, true)
    }

    /// Attach content to the most recently appended step
    pub fn hosting(mut self, content: Arc<dyn StepContent>) -> Self {
        match self.steps.last_mut() {
            Some(step) => step.content = Some(content),
            None => self.orphan_content = true,
        }
        self
    }

    pub fn build(self) -> Result<StepSequence> {
        if self.orphan_content {
            return Err(WizardError::InvalidSequence(
                "content attached before any step was added".to_string(),
            ));
        }
        StepSequence::new(self.steps)
    }

    fn push(mut self, label: impl Into<String>, optional: bool) -> Self {
        let index = self.steps.len();
        self.steps.push(StepDefinition::new(index, label, optional));
        self
    }
}
