use tokio::sync::broadcast;
use tracing::debug;

use super::events::ExperimentEvent;

/// Event bus for distributing events throughout the application
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ExperimentEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emits an event to every subscriber
    pub fn emit(&self, event: ExperimentEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(
                    event_type = event_type,
                    receivers = receiver_count,
                    "Event emitted"
                );
            }
            Err(_) => {
                debug!(event_type = event_type, "Event emitted with no receivers");
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExperimentEvent> {
        self.sender.subscribe()
    }
}
