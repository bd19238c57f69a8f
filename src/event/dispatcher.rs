use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast::error::RecvError, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    bus::EventBus,
    events::ExperimentEvent,
    handler::{EventError, EventHandler},
};

/// Bounded memory of event ids that were already dispatched
struct SeenEvents {
    ids: HashSet<Uuid>,
    order: VecDeque<Uuid>,
    capacity: usize,
}

impl SeenEvents {
    fn new(capacity: usize) -> Self {
        Self {
            ids: HashSet::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Records the id, returning false if it was already present
    fn insert(&mut self, id: Uuid) -> bool {
        if !self.ids.insert(id) {
            return false;
        }
        self.order.push_back(id);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        true
    }
}

/// Routes events from the bus to the registered handlers
///
/// Events are processed one at a time. Each handler sees an event in
/// registration order, and any events a handler returns are delivered before
/// the next event is taken off the bus, so a whole cascade (group code ->
/// game created -> game started -> ...) completes without interleaving.
///
/// Every event id is delivered at most once. A duplicate delivery is dropped
/// here, before any handler runs.
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
    event_bus: EventBus,
    handler_timeout: Duration,
    max_retries: u32,
    seen: Mutex<SeenEvents>,
}

impl EventDispatcher {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            handlers: Vec::new(),
            event_bus,
            handler_timeout: Duration::from_secs(5),
            max_retries: 3,
            seen: Mutex::new(SeenEvents::new(4096)),
        }
    }

    /// Add an event handler to the dispatcher
    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        info!(handler_name = handler.name(), "Registering event handler");
        self.handlers.push(handler);
    }

    /// Set the timeout for individual handler execution
    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = timeout;
        self
    }

    /// Set the maximum number of retries for failed handlers
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set how many recent event ids are remembered for deduplication
    pub fn with_dedup_window(mut self, window: usize) -> Self {
        self.seen = Mutex::new(SeenEvents::new(window.max(1)));
        self
    }

    /// Dispatch an event and every follow-up event it causes
    ///
    /// Returns the number of events that were actually delivered to handlers
    /// (duplicates are not counted).
    pub async fn dispatch(&self, event: ExperimentEvent) -> usize {
        let mut queue = VecDeque::from([event]);
        let mut delivered = 0;

        while let Some(event) = queue.pop_front() {
            if !self.seen.lock().await.insert(event.id) {
                debug!(
                    event_id = %event.id,
                    event_type = event.event_type(),
                    "Dropping duplicate event delivery"
                );
                continue;
            }

            delivered += 1;
            debug!(
                event_id = %event.id,
                event_type = event.event_type(),
                "Dispatching event to {} handlers",
                self.handlers.len()
            );

            for handler in &self.handlers {
                match self.handle_with_retry(handler.as_ref(), &event).await {
                    Ok(follow_ups) => queue.extend(follow_ups),
                    Err(e) => {
                        error!(
                            handler = handler.name(),
                            event_type = event.event_type(),
                            error = %e,
                            "Handler failed permanently"
                        );
                    }
                }
            }
        }

        delivered
    }

    /// Start listening for events on the bus and dispatching them to handlers
    ///
    /// The background task runs until the bus is dropped.
    pub fn start_listening(self: Arc<Self>) -> JoinHandle<()> {
        let mut receiver = self.event_bus.subscribe();

        info!(
            handler_count = self.handlers.len(),
            timeout_ms = self.handler_timeout.as_millis() as u64,
            max_retries = self.max_retries,
            "Starting event dispatcher"
        );

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        self.dispatch(event).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped = skipped, "Event dispatcher lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            info!("Event dispatcher stopped listening");
        })
    }

    /// Handle an event with retry logic and timeout
    async fn handle_with_retry(
        &self,
        handler: &dyn EventHandler,
        event: &ExperimentEvent,
    ) -> Result<Vec<ExperimentEvent>, EventError> {
        let handler_name = handler.name();
        let event_type = event.event_type();

        for attempt in 0..=self.max_retries {
            let error = match timeout(self.handler_timeout, handler.handle(event)).await {
                Ok(Ok(follow_ups)) => {
                    if attempt > 0 {
                        info!(
                            handler = handler_name,
                            event_type = event_type,
                            attempt = attempt + 1,
                            "Handler succeeded after retry"
                        );
                    }
                    return Ok(follow_ups);
                }
                Ok(Err(e)) => e,
                Err(_elapsed) => EventError::Timeout,
            };

            if !error.is_retryable() || attempt == self.max_retries {
                return Err(error);
            }

            warn!(
                handler = handler_name,
                event_type = event_type,
                attempt = attempt + 1,
                error = %error,
                "Handler failed, will retry"
            );

            // Exponential backoff
            let delay = Duration::from_millis(100 * 2_u64.pow(attempt));
            tokio::time::sleep(delay).await;
        }

        Err(EventError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingHandler {
        name: &'static str,
        call_count: AtomicU32,
    }

    impl CountingHandler {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                call_count: AtomicU32::new(0),
            })
        }

        fn call_count(&self) -> u32 {
            self.call_count.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(
            &self,
            _event: &ExperimentEvent,
        ) -> Result<Vec<ExperimentEvent>, EventError> {
            self.call_count.fetch_add(1, Ordering::Relaxed);
            Ok(vec![])
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    /// Answers every GameStarted with a GameEnded for the same game
    struct ChainingHandler;

    #[async_trait]
    impl EventHandler for ChainingHandler {
        async fn handle(
            &self,
            event: &ExperimentEvent,
        ) -> Result<Vec<ExperimentEvent>, EventError> {
            match &event.kind {
                EventKind::GameStarted { game_id } => {
                    Ok(vec![ExperimentEvent::new(EventKind::GameEnded {
                        game_id: game_id.clone(),
                    })])
                }
                _ => Ok(vec![]),
            }
        }

        fn name(&self) -> &'static str {
            "ChainingHandler"
        }
    }

    struct FailingHandler {
        fail_count: AtomicU32,
        max_failures: u32,
    }

    impl FailingHandler {
        fn new(max_failures: u32) -> Arc<Self> {
            Arc::new(Self {
                fail_count: AtomicU32::new(0),
                max_failures,
            })
        }
    }

    #[async_trait]
    impl EventHandler for FailingHandler {
        async fn handle(
            &self,
            _event: &ExperimentEvent,
        ) -> Result<Vec<ExperimentEvent>, EventError> {
            let current = self.fail_count.fetch_add(1, Ordering::Relaxed);
            if current < self.max_failures {
                Err(EventError::retryable("Simulated failure"))
            } else {
                Ok(vec![])
            }
        }

        fn name(&self) -> &'static str {
            "FailingHandler"
        }
    }

    fn game_started(game_id: &str) -> ExperimentEvent {
        ExperimentEvent::new(EventKind::GameStarted {
            game_id: game_id.to_string(),
        })
    }

    #[tokio::test]
    async fn test_dispatcher_basic_functionality() {
        let mut dispatcher = EventDispatcher::new(EventBus::new(16));

        let handler1 = CountingHandler::new("handler1");
        let handler2 = CountingHandler::new("handler2");
        dispatcher.add_handler(handler1.clone());
        dispatcher.add_handler(handler2.clone());

        let delivered = dispatcher.dispatch(game_started("g1")).await;

        assert_eq!(delivered, 1);
        assert_eq!(handler1.call_count(), 1);
        assert_eq!(handler2.call_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_event_is_delivered_once() {
        let mut dispatcher = EventDispatcher::new(EventBus::new(16));
        let handler = CountingHandler::new("counter");
        dispatcher.add_handler(handler.clone());

        let event = game_started("g1");
        assert_eq!(dispatcher.dispatch(event.clone()).await, 1);
        assert_eq!(dispatcher.dispatch(event).await, 0);

        assert_eq!(handler.call_count(), 1);
    }

    #[tokio::test]
    async fn test_dedup_window_forgets_oldest_ids() {
        let mut dispatcher =
            EventDispatcher::new(EventBus::new(16)).with_dedup_window(1);
        let handler = CountingHandler::new("counter");
        dispatcher.add_handler(handler.clone());

        let first = game_started("g1");
        dispatcher.dispatch(first.clone()).await;
        dispatcher.dispatch(game_started("g2")).await;
        dispatcher.dispatch(first).await;

        assert_eq!(handler.call_count(), 3);
    }

    #[tokio::test]
    async fn test_follow_up_events_are_drained() {
        let mut dispatcher = EventDispatcher::new(EventBus::new(16));
        let counter = CountingHandler::new("counter");
        dispatcher.add_handler(Arc::new(ChainingHandler));
        dispatcher.add_handler(counter.clone());

        let delivered = dispatcher.dispatch(game_started("g1")).await;

        assert_eq!(delivered, 2);
        assert_eq!(counter.call_count(), 2);
    }

    #[tokio::test]
    async fn test_dispatcher_retry_logic() {
        let mut dispatcher = EventDispatcher::new(EventBus::new(16))
            .with_max_retries(3)
            .with_handler_timeout(Duration::from_millis(100));

        // Handler that fails twice then succeeds
        let handler = FailingHandler::new(2);
        dispatcher.add_handler(handler.clone());

        dispatcher.dispatch(game_started("g1")).await;

        // Initial attempt + 2 retries
        assert_eq!(handler.fail_count.load(Ordering::Relaxed), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_is_not_retried() {
        struct Rejecting(AtomicU32);

        #[async_trait]
        impl EventHandler for Rejecting {
            async fn handle(
                &self,
                _event: &ExperimentEvent,
            ) -> Result<Vec<ExperimentEvent>, EventError> {
                self.0.fetch_add(1, Ordering::Relaxed);
                Err(EventError::non_retryable("nope"))
            }

            fn name(&self) -> &'static str {
                "Rejecting"
            }
        }

        let mut dispatcher = EventDispatcher::new(EventBus::new(16));
        let handler = Arc::new(Rejecting(AtomicU32::new(0)));
        dispatcher.add_handler(handler.clone());

        dispatcher.dispatch(game_started("g1")).await;

        assert_eq!(handler.0.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_listening_loop_dispatches_bus_events() {
        let bus = EventBus::new(16);
        let mut dispatcher = EventDispatcher::new(bus.clone());
        let handler = CountingHandler::new("counter");
        dispatcher.add_handler(handler.clone());

        let _listener = Arc::new(dispatcher).start_listening();

        bus.emit(game_started("g1"));

        for _ in 0..50 {
            if handler.call_count() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(handler.call_count(), 1);
    }
}
