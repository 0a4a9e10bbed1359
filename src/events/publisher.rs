use super::types::WizardEvent;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Broadcast publisher for wizard state-change notifications
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<PublishedEvent>,
}

/// Event that has been published
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub run_id: Uuid,
    pub event: WizardEvent,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event for the given run.
    ///
    /// Publishing with no subscribers is not an error; lagging subscribers
    /// observe `RecvError::Lagged` on their side.
    pub fn publish(&self, run_id: Uuid, event: WizardEvent) {
        tracing::trace!(run_id = %run_id, event = event.name(), "Publishing wizard event");

        let event = PublishedEvent {
            run_id,
            event,
            published_at: chrono::Utc::now(),
        };

        if self.sender.send(event).is_err() {
            tracing::trace!(run_id = %run_id, "No subscribers for wizard event");
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}
