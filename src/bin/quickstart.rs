//! Quickstart Binary
//!
//! Drives the three-step repository quickstart flow end to end with
//! simulated actions: create a repository, optionally import data, then
//! submit Spark configurations.

use anyhow::{anyhow, Context};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot};
use tracing::{error, info, warn};

use wizard_core::logging::init_structured_logging;
use wizard_core::wizard::{
    AccumulatedState, ActionOutcome, FnAction, StepActionRunner, StepContent, StepContext,
    StepPayload, StepSequence, WizardController,
};
use wizard_core::{EventPublisher, PublishedEvent, WizardConfig, WizardEvent, WizardPhase};

/// Namespace accepted by the simulated storage backend
const STORAGE_NAMESPACE: &str = "s3://quickstart-bucket/repos";

#[derive(Debug, Clone)]
struct RepositoryRequest {
    name: String,
    branch: String,
    namespace: String,
}

/// Hosts the repository creation form. The first attempt hits a simulated
/// name conflict, the retry succeeds under a suffixed name.
struct CreateRepositoryContent {
    attempts: Arc<AtomicUsize>,
    request: RepositoryRequest,
}

impl StepContent for CreateRepositoryContent {
    fn activate(&self, context: StepContext) {
        let attempts = Arc::clone(&self.attempts);
        let action = FnAction::new("create repository", move |request: RepositoryRequest| {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    return Err(anyhow!("repository '{}' already exists", request.name));
                }
                let repo_id = format!("{}-{attempt}", request.name);
                Ok(to_payload(json!({
                    "repoId": repo_id,
                    "branch": request.branch,
                    "namespace": request.namespace,
                })))
            }
        });

        let runner = StepActionRunner::new(action, context.completion);
        let request = self.request.clone();
        tokio::spawn(async move {
            loop {
                match runner.invoke(request.clone()).await {
                    Ok(ActionOutcome::Completed(disposition)) => {
                        info!(?disposition, "Repository created");
                        break;
                    }
                    Ok(ActionOutcome::Failed { reason }) => {
                        warn!(reason = %reason, "Repository creation failed, retrying");
                    }
                    Err(err) => {
                        error!(error = %err, "Repository creation rejected");
                        break;
                    }
                }
            }
        });
    }
}

/// Submits the Spark configuration form as soon as it is shown
struct SparkConfigurationsContent;

impl StepContent for SparkConfigurationsContent {
    fn activate(&self, context: StepContext) {
        let payload = to_payload(json!({
            "sparkConfigs": {
                "spark.hadoop.fs.s3a.endpoint": "http://localhost:9000",
                "spark.hadoop.fs.s3a.path.style.access": "true",
            }
        }));
        if let Err(err) = context.completion.complete(payload) {
            error!(error = %err, step = %context.label, "Failed to submit configurations");
        }
    }
}

fn to_payload(value: Value) -> StepPayload {
    match value {
        Value::Object(map) => map,
        _ => StepPayload::new(),
    }
}

fn quickstart_steps() -> wizard_core::Result<StepSequence> {
    StepSequence::builder()
        .step("Create Repository")
        .hosting(Arc::new(CreateRepositoryContent {
            attempts: Arc::new(AtomicUsize::new(0)),
            request: RepositoryRequest {
                name: "quickstart".to_string(),
                branch: "main".to_string(),
                namespace: STORAGE_NAMESPACE.to_string(),
            },
        }))
        .optional_step("Import Data")
        .step("Spark Configurations")
        .hosting(Arc::new(SparkConfigurationsContent))
        .build()
}

/// Wait until the step at `index` reports completion
async fn wait_for_completion(
    events: &mut broadcast::Receiver<PublishedEvent>,
    index: usize,
) -> anyhow::Result<()> {
    loop {
        match events.recv().await {
            Ok(PublishedEvent {
                event: WizardEvent::StepCompleted { step_index },
                ..
            }) if step_index == index => return Ok(()),
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event receiver lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                return Err(anyhow!("event channel closed before step {index} completed"));
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_structured_logging();

    let config = WizardConfig::load().unwrap_or_else(|err| {
        warn!(error = %err, "Falling back to default wizard configuration");
        WizardConfig::default()
    });

    let publisher = EventPublisher::new(config.event_channel_capacity);
    let mut events = publisher.subscribe();
    let (done_tx, done_rx) = oneshot::channel::<AccumulatedState>();

    let controller = WizardController::builder(quickstart_steps()?)
        .config(&config)
        .show_back(false)
        .publisher(publisher)
        .on_done(move |state| {
            let _ = done_tx.send(state);
        })
        .on_cancel(|| warn!("Quickstart cancelled"))
        .start();

    info!(run_id = %controller.run_id(), "Quickstart started");

    wait_for_completion(&mut events, 0).await?;
    controller.advance()?;

    // Import Data is optional and skipped here
    controller.advance()?;

    wait_for_completion(&mut events, 2).await?;
    let phase = controller.advance()?;
    if phase != WizardPhase::Done {
        return Err(anyhow!("expected the run to finish, still at {phase}"));
    }

    let state = done_rx
        .await
        .context("wizard finished without reporting its state")?;
    let repo_id = state
        .get("repoId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    println!("{}", serde_json::to_string_pretty(&Value::Object(state))?);
    println!("next: /repositories/{repo_id}/objects");

    Ok(())
}
