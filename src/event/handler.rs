use async_trait::async_trait;
use thiserror::Error;

use super::events::ExperimentEvent;

/// Errors that can occur when handling events
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Handler timed out")]
    Timeout,

    #[error("Retryable error: {0}")]
    Retryable(String),

    #[error("Non-retryable error: {0}")]
    NonRetryable(String),
}

impl EventError {
    /// Whether this error indicates the operation should be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, EventError::Retryable(_) | EventError::Timeout)
    }

    /// Create a retryable error
    pub fn retryable(msg: impl Into<String>) -> Self {
        EventError::Retryable(msg.into())
    }

    /// Create a non-retryable error
    pub fn non_retryable(msg: impl Into<String>) -> Self {
        EventError::NonRetryable(msg.into())
    }
}

/// Trait for components that react to experiment events
///
/// A handler inspects the event, applies whatever mutations it owns through
/// the services, and returns the events those mutations produced. The
/// dispatcher delivers the returned events before taking the next one off
/// the bus.
///
/// Handlers should be idempotent where possible - handling the same
/// event multiple times should be safe.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &ExperimentEvent) -> Result<Vec<ExperimentEvent>, EventError>;

    /// Get a human-readable name for this handler (for logging/debugging)
    fn name(&self) -> &'static str;
}
