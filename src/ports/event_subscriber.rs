//! EventSubscriber port - Interface for subscribing to events.
//!
//! This port defines how handlers register interest in events
//! without knowing which module publishes them.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing events.
///
/// Implementations should be:
/// - **Idempotent** - the same fact may be published more than once, and
///   there is no cross-handler rollback
/// - **Independent** - never assume a sibling handler of the same event ran,
///   succeeded, or was rolled back
///
/// # Example
///
/// ```ignore
/// struct ProfileProjection { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for ProfileProjection {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         match ModuleEvent::from_envelope(&event)? {
///             ModuleEvent::UserRegistered(e) => { /* insert, ignoring conflicts */ }
///             _ => {}
///         }
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "ProfileProjection"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging and error reports.
    fn name(&self) -> &'static str;
}

/// Capability returned by `subscribe` that removes exactly that handler.
///
/// Dropping the handle keeps the handler subscribed; only `unsubscribe`
/// removes it. Calling `unsubscribe` more than once is a no-op.
pub struct Subscription {
    event_type: String,
    cancel: Box<dyn Fn() + Send + Sync>,
}

impl Subscription {
    /// Creates a handle around the adapter's removal action.
    ///
    /// `cancel` must itself be idempotent.
    pub fn new(event_type: impl Into<String>, cancel: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            event_type: event_type.into(),
            cancel: Box::new(cancel),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Removes the handler from the bus.
    pub fn unsubscribe(&self) {
        (self.cancel)();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("event_type", &self.event_type)
            .finish_non_exhaustive()
    }
}

/// Port for subscribing to events.
///
/// # Example
///
/// ```ignore
/// let sub = subscriber.subscribe("auth.user_registered", projection.clone());
/// subscriber.subscribe_all(&["auth.user_registered", "auth.user_deleted"], projection);
/// sub.unsubscribe();
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) -> Subscription;

    /// Subscribe the same handler instance to several event types.
    fn subscribe_all(
        &self,
        event_types: &[&str],
        handler: Arc<dyn EventHandler>,
    ) -> Vec<Subscription> {
        event_types
            .iter()
            .map(|event_type| self.subscribe(event_type, Arc::clone(&handler)))
            .collect()
    }
}
