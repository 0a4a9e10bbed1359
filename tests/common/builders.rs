//! Shared fixtures for wizard integration tests

use anyhow::anyhow;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use wizard_core::wizard::{
    AccumulatedState, StepAction, StepPayload, StepSequence, WizardControllerBuilder,
};
use wizard_core::{PublishedEvent, WizardEvent};

pub fn payload(value: Value) -> StepPayload {
    value.as_object().cloned().unwrap_or_default()
}

/// Create Repository (mandatory), Import Data (optional), Spark Configurations (mandatory)
pub fn quickstart_steps() -> StepSequence {
    StepSequence::builder()
        .step("Create Repository")
        .optional_step("Import Data")
        .step("Spark Configurations")
        .build()
        .expect("quickstart sequence is valid")
}

/// Counts terminal callback invocations and keeps the final state
#[derive(Clone, Default)]
pub struct CallbackRecorder {
    done_calls: Arc<AtomicUsize>,
    cancel_calls: Arc<AtomicUsize>,
    final_state: Arc<Mutex<Option<AccumulatedState>>>,
}

impl CallbackRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register both terminal callbacks on `builder`
    pub fn attach(&self, builder: WizardControllerBuilder) -> WizardControllerBuilder {
        let done = self.clone();
        let cancel = self.clone();
        builder
            .on_done(move |state| {
                done.done_calls.fetch_add(1, Ordering::SeqCst);
                *done.final_state.lock() = Some(state);
            })
            .on_cancel(move || {
                cancel.cancel_calls.fetch_add(1, Ordering::SeqCst);
            })
    }

    pub fn done_calls(&self) -> usize {
        self.done_calls.load(Ordering::SeqCst)
    }

    pub fn cancel_calls(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    pub fn final_state(&self) -> Option<Value> {
        self.final_state.lock().clone().map(Value::Object)
    }
}

/// Collect every event already buffered on `receiver`
pub fn drain_events(receiver: &mut broadcast::Receiver<PublishedEvent>) -> Vec<WizardEvent> {
    let mut events = Vec::new();
    while let Ok(published) = receiver.try_recv() {
        events.push(published.event);
    }
    events
}

type Gate = oneshot::Receiver<anyhow::Result<StepPayload>>;

/// Step action whose outcomes are released by the test, one gate per call
#[derive(Default)]
pub struct GatedAction {
    gates: Mutex<VecDeque<Gate>>,
    calls: AtomicUsize,
}

impl GatedAction {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a gate for the next call; send on the returned sender to resolve it
    pub fn gate(&self) -> oneshot::Sender<anyhow::Result<StepPayload>> {
        let (sender, receiver) = oneshot::channel();
        self.gates.lock().push_back(receiver);
        sender
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StepAction for GatedAction {
    type Input = ();

    async fn perform(&self, _input: ()) -> anyhow::Result<StepPayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().pop_front();
        match gate {
            Some(gate) => gate
                .await
                .unwrap_or_else(|_| Err(anyhow!("gate dropped without an outcome"))),
            None => Err(anyhow!("no gate queued for this call")),
        }
    }

    fn description(&self) -> &'static str {
        "gated test action"
    }
}
