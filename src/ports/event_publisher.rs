//! EventPublisher port - Interface for publishing events to other modules.
//!
//! Publishers do not know who (if anyone) listens. A publish with no
//! subscribers is a successful no-op.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing events.
///
/// Implementations must ensure:
/// - Every handler subscribed when fan-out starts is invoked exactly once
/// - Handler failures are reported to the caller (`HANDLER_FAILED`), never
///   swallowed, with every individual failure attached as a cause
/// - Handlers that already succeeded are not compensated when a sibling fails
///
/// # Example
///
/// ```ignore
/// let envelope = UserRegistered::from(&user).to_envelope()?;
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event and wait for all its handlers.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish several events concurrently.
    ///
    /// Succeeds only if every individual publish succeeds. No ordering is
    /// guaranteed between the events; callers that need ordering publish
    /// sequentially.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}
