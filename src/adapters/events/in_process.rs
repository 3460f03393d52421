//! In-process event bus.
//!
//! Routes envelopes by event type to every subscribed handler. Handlers for
//! one publish run concurrently as separate tokio tasks and are all joined
//! before `publish` returns.

use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use tracing::{debug, warn};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber, Subscription};

struct Registration {
    id: u64,
    handler: Arc<dyn EventHandler>,
}

type HandlerMap = HashMap<String, Vec<Registration>>;

/// Event bus owned by one process.
///
/// Construct one per composition root and inject it; tests build as many
/// independent instances as they like.
///
/// Guarantees:
/// - A publish reaches exactly the handlers subscribed when fan-out starts;
///   handlers added during delivery wait for the next publish
/// - A failing or panicking handler never cancels its siblings
/// - Every failure is reported, aggregated under `HANDLER_FAILED`
///
/// No ordering is guaranteed between handlers of one event or between
/// concurrent publishes. The bus never retries.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InProcessEventBus::new());
/// let sub = bus.subscribe("auth.user_registered", projection);
///
/// bus.publish(envelope).await?;
/// sub.unsubscribe();
/// ```
pub struct InProcessEventBus {
    handlers: Arc<RwLock<HandlerMap>>,
    next_id: AtomicU64,
}

impl InProcessEventBus {
    /// Creates a new bus with no subscribers.
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of handlers currently subscribed to an event type.
    pub fn subscriber_count(&self, event_type: &str) -> usize {
        read(&self.handlers)
            .get(event_type)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn snapshot(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        read(&self.handlers)
            .get(event_type)
            .map(|registrations| {
                registrations
                    .iter()
                    .map(|r| Arc::clone(&r.handler))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for InProcessEventBus {
    fn default() -> Self {
        Self::new()
    }
}

// The map is only ever mutated by single push/retain calls, so a panic while
// a guard was held cannot leave it half-updated.
fn read(handlers: &RwLock<HandlerMap>) -> RwLockReadGuard<'_, HandlerMap> {
    handlers.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(handlers: &RwLock<HandlerMap>) -> RwLockWriteGuard<'_, HandlerMap> {
    handlers.write().unwrap_or_else(PoisonError::into_inner)
}

fn remove_registration(handlers: &Weak<RwLock<HandlerMap>>, event_type: &str, id: u64) {
    let Some(handlers) = handlers.upgrade() else {
        return;
    };
    let mut map = write(&handlers);
    if let Some(registrations) = map.get_mut(event_type) {
        registrations.retain(|r| r.id != id);
        if registrations.is_empty() {
            map.remove(event_type);
        }
    }
}

#[async_trait]
impl EventPublisher for InProcessEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        // Snapshot releases the lock before any await point.
        let handlers = self.snapshot(&event.event_type);

        if handlers.is_empty() {
            debug!(event_type = %event.event_type, event_id = %event.event_id, "No subscribers for event");
            return Ok(());
        }

        let total = handlers.len();
        debug!(
            event_type = %event.event_type,
            event_id = %event.event_id,
            handlers = total,
            "Dispatching event"
        );

        // Spawned tasks keep running even if this future is dropped.
        let (names, tasks): (Vec<&'static str>, Vec<_>) = handlers
            .into_iter()
            .map(|handler| {
                let event = event.clone();
                let name = handler.name();
                (name, tokio::spawn(async move { handler.handle(event).await }))
            })
            .unzip();

        let outcomes = join_all(tasks).await;

        let failures: Vec<DomainError> = names
            .into_iter()
            .zip(outcomes)
            .filter_map(|(name, outcome)| match outcome {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err.with_detail("handler", name)),
                Err(join_err) => Some(
                    DomainError::new(
                        ErrorCode::InternalError,
                        format!("Handler panicked: {}", join_err),
                    )
                    .with_detail("handler", name),
                ),
            })
            .collect();

        if failures.is_empty() {
            return Ok(());
        }

        for failure in &failures {
            warn!(
                event_type = %event.event_type,
                event_id = %event.event_id,
                handler = failure.detail("handler").unwrap_or_default(),
                error = %failure,
                "Event handler failed"
            );
        }

        let summary = failures
            .iter()
            .map(|f| format!("{}: {}", f.detail("handler").unwrap_or_default(), f))
            .collect::<Vec<_>>()
            .join(", ");

        Err(DomainError::aggregate(
            ErrorCode::HandlerFailed,
            format!(
                "{} of {} handlers failed for '{}': {}",
                failures.len(),
                total,
                event.event_type,
                summary
            ),
            failures,
        )
        .with_detail("event_type", event.event_type.clone()))
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        let total = events.len();
        let outcomes = join_all(events.into_iter().map(|event| self.publish(event))).await;

        let failures: Vec<DomainError> = outcomes.into_iter().filter_map(Result::err).collect();
        if failures.is_empty() {
            return Ok(());
        }

        Err(DomainError::aggregate(
            ErrorCode::HandlerFailed,
            format!("{} of {} events had failing handlers", failures.len(), total),
            failures,
        ))
    }
}

impl EventSubscriber for InProcessEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(event_type, handler = handler.name(), "Subscribing handler");

        write(&self.handlers)
            .entry(event_type.to_string())
            .or_default()
            .push(Registration { id, handler });

        let handlers = Arc::downgrade(&self.handlers);
        let key = event_type.to_string();
        Subscription::new(event_type, move || remove_registration(&handlers, &key, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Barrier;

    fn test_envelope(event_type: &str) -> EventEnvelope {
        EventEnvelope::new(event_type, json!({}))
    }

    struct CountingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn name(&self) -> &'static str {
            "CountingHandler"
        }
    }

    struct FailingHandler(&'static str);

    #[async_trait]
    impl EventHandler for FailingHandler {
        async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "insert failed"))
        }
        fn name(&self) -> &'static str {
            self.0
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let bus = InProcessEventBus::new();

        bus.publish(test_envelope("nobody.listens")).await.unwrap();

        assert_eq!(bus.subscriber_count("nobody.listens"), 0);
    }

    #[tokio::test]
    async fn handler_receives_published_event() {
        let bus = InProcessEventBus::new();
        let received = Arc::new(AtomicBool::new(false));

        struct TestHandler(Arc<AtomicBool>);

        #[async_trait]
        impl EventHandler for TestHandler {
            async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
                assert_eq!(event.event_type, "test.event");
                self.0.store(true, Ordering::SeqCst);
                Ok(())
            }
            fn name(&self) -> &'static str {
                "TestHandler"
            }
        }

        bus.subscribe("test.event", Arc::new(TestHandler(received.clone())));
        bus.publish(test_envelope("test.event")).await.unwrap();

        assert!(received.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn multiple_handlers_each_invoked_exactly_once() {
        let bus = InProcessEventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            bus.subscribe("test.event", Arc::new(CountingHandler(counter.clone())));
        }

        bus.publish(test_envelope("test.event")).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn every_handler_sees_the_same_event() {
        let bus = InProcessEventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        struct RecordingHandler(Arc<Mutex<Vec<EventEnvelope>>>);

        #[async_trait]
        impl EventHandler for RecordingHandler {
            async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
                self.0.lock().unwrap().push(event);
                Ok(())
            }
            fn name(&self) -> &'static str {
                "RecordingHandler"
            }
        }

        bus.subscribe("test.event", Arc::new(RecordingHandler(seen.clone())));
        bus.subscribe("test.event", Arc::new(RecordingHandler(seen.clone())));

        let event = test_envelope("test.event");
        bus.publish(event.clone()).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|e| *e == event));
    }

    #[tokio::test]
    async fn handlers_run_concurrently() {
        let bus = InProcessEventBus::new();
        // Each handler waits for all the others: only concurrent delivery completes.
        let barrier = Arc::new(Barrier::new(3));

        struct RendezvousHandler(Arc<Barrier>);

        #[async_trait]
        impl EventHandler for RendezvousHandler {
            async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
                self.0.wait().await;
                Ok(())
            }
            fn name(&self) -> &'static str {
                "RendezvousHandler"
            }
        }

        for _ in 0..3 {
            bus.subscribe("test.event", Arc::new(RendezvousHandler(barrier.clone())));
        }

        tokio::time::timeout(Duration::from_secs(5), bus.publish(test_envelope("test.event")))
            .await
            .expect("handlers were not run concurrently")
            .unwrap();
    }

    #[tokio::test]
    async fn subscribe_all_registers_for_multiple_types() {
        let bus = InProcessEventBus::new();
        let received = Arc::new(AtomicUsize::new(0));

        let subs = bus.subscribe_all(
            &["type.a", "type.b", "type.c"],
            Arc::new(CountingHandler(received.clone())),
        );

        bus.publish(test_envelope("type.a")).await.unwrap();
        bus.publish(test_envelope("type.b")).await.unwrap();
        bus.publish(test_envelope("type.d")).await.unwrap(); // Not subscribed

        assert_eq!(subs.len(), 3);
        assert_eq!(received.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unsubscribe_removes_only_that_handler() {
        let bus = InProcessEventBus::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let sub = bus.subscribe("test.event", Arc::new(CountingHandler(first.clone())));
        bus.subscribe("test.event", Arc::new(CountingHandler(second.clone())));

        sub.unsubscribe();
        sub.unsubscribe(); // idempotent
        bus.publish(test_envelope("test.event")).await.unwrap();

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count("test.event"), 1);
    }

    #[tokio::test]
    async fn unsubscribe_after_bus_dropped_is_harmless() {
        let bus = InProcessEventBus::new();
        let sub = bus.subscribe("test.event", Arc::new(FailingHandler("H")));
        drop(bus);

        sub.unsubscribe();
    }

    #[tokio::test]
    async fn handler_error_is_propagated() {
        let bus = InProcessEventBus::new();
        bus.subscribe("test.event", Arc::new(FailingHandler("FailingHandler")));

        let err = bus.publish(test_envelope("test.event")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::HandlerFailed);
        assert!(err.message.contains("FailingHandler"));
        assert_eq!(err.detail("event_type"), Some("test.event"));
    }

    #[tokio::test]
    async fn failure_does_not_undo_sibling_side_effects() {
        let bus = InProcessEventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        bus.subscribe("test.event", Arc::new(CountingHandler(counter.clone())));
        bus.subscribe("test.event", Arc::new(FailingHandler("Failing")));
        bus.subscribe("test.event", Arc::new(CountingHandler(counter.clone())));

        let result = bus.publish(test_envelope("test.event")).await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn all_failures_are_collected() {
        let bus = InProcessEventBus::new();
        bus.subscribe("test.event", Arc::new(FailingHandler("First")));
        bus.subscribe("test.event", Arc::new(FailingHandler("Second")));

        let err = bus.publish(test_envelope("test.event")).await.unwrap_err();

        let mut handlers: Vec<&str> = err
            .causes
            .iter()
            .filter_map(|c| c.detail("handler"))
            .collect();
        handlers.sort();
        assert_eq!(handlers, ["First", "Second"]);
        assert!(err.message.starts_with("2 of 2 handlers failed"));
    }

    #[tokio::test]
    async fn panicking_handler_is_reported_as_failure() {
        let bus = InProcessEventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));

        struct PanickingHandler;

        #[async_trait]
        impl EventHandler for PanickingHandler {
            async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
                panic!("boom");
            }
            fn name(&self) -> &'static str {
                "PanickingHandler"
            }
        }

        bus.subscribe("test.event", Arc::new(PanickingHandler));
        bus.subscribe("test.event", Arc::new(CountingHandler(counter.clone())));

        let err = bus.publish(test_envelope("test.event")).await.unwrap_err();

        assert_eq!(err.causes.len(), 1);
        assert_eq!(err.causes[0].code, ErrorCode::InternalError);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropping_publish_does_not_cancel_running_handlers() {
        let bus = InProcessEventBus::new();
        let finished = Arc::new(AtomicUsize::new(0));

        struct SlowHandler(Arc<AtomicUsize>);

        #[async_trait]
        impl EventHandler for SlowHandler {
            async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
                tokio::time::sleep(Duration::from_millis(100)).await;
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            fn name(&self) -> &'static str {
                "SlowHandler"
            }
        }

        bus.subscribe("test.event", Arc::new(SlowHandler(finished.clone())));

        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), bus.publish(test_envelope("test.event")))
                .await;
        assert!(timed_out.is_err());
        assert_eq!(finished.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handlers_subscribed_during_delivery_wait_for_next_publish() {
        let bus = Arc::new(InProcessEventBus::new());
        let late_calls = Arc::new(AtomicUsize::new(0));

        struct SubscribingHandler {
            bus: Weak<InProcessEventBus>,
            late_calls: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl EventHandler for SubscribingHandler {
            async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
                if let Some(bus) = self.bus.upgrade() {
                    bus.subscribe(
                        "test.event",
                        Arc::new(CountingHandler(self.late_calls.clone())),
                    );
                }
                Ok(())
            }
            fn name(&self) -> &'static str {
                "SubscribingHandler"
            }
        }

        let sub = bus.subscribe(
            "test.event",
            Arc::new(SubscribingHandler {
                bus: Arc::downgrade(&bus),
                late_calls: late_calls.clone(),
            }),
        );

        bus.publish(test_envelope("test.event")).await.unwrap();
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);

        sub.unsubscribe();
        bus.publish(test_envelope("test.event")).await.unwrap();
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn publish_all_publishes_every_event() {
        let bus = InProcessEventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        bus.subscribe_all(&["type.a", "type.b"], Arc::new(CountingHandler(counter.clone())));

        bus.publish_all(vec![
            test_envelope("type.a"),
            test_envelope("type.b"),
            test_envelope("type.c"),
        ])
        .await
        .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn publish_all_fails_if_any_publish_fails() {
        let bus = InProcessEventBus::new();
        let counter = Arc::new(AtomicUsize::new(0));
        bus.subscribe("type.a", Arc::new(CountingHandler(counter.clone())));
        bus.subscribe("type.b", Arc::new(FailingHandler("Failing")));

        let err = bus
            .publish_all(vec![test_envelope("type.a"), test_envelope("type.b")])
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::HandlerFailed);
        assert_eq!(err.causes.len(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
