//! Event infrastructure shared by every module.
//!
//! - `EventId` - Unique identifier for one published event (log correlation)
//! - `EventMetadata` - Correlation context
//! - `EventEnvelope` - The immutable value routed by the event bus
//! - `DomainEvent` - Trait implemented by typed event payloads

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::{DomainError, ErrorCode, Timestamp};

// ============================================
// DomainEvent Trait
// ============================================

/// Trait implemented by typed event payloads.
///
/// The event type is the only routing key the bus knows about. It follows the
/// `"<domain>.<fact>"` convention (e.g. `auth.user_registered`) and, with the
/// payload shape, is the whole coupling contract between modules. Payloads
/// evolve by adding optional fields only.
pub trait DomainEvent: Serialize + Send + Sync {
    /// Returns the namespaced event type string.
    fn event_type(&self) -> &'static str;

    /// Returns when the event occurred.
    fn occurred_at(&self) -> Timestamp;

    /// Serializes this event into an envelope ready for publishing.
    fn to_envelope(&self) -> Result<EventEnvelope, DomainError> {
        let payload = serde_json::to_value(self).map_err(|e| {
            DomainError::new(
                ErrorCode::InvalidEventPayload,
                format!("Failed to serialize {} payload: {}", self.event_type(), e),
            )
        })?;

        Ok(EventEnvelope {
            event_id: EventId::new(),
            event_type: self.event_type().to_string(),
            occurred_at: self.occurred_at(),
            payload,
            metadata: EventMetadata::default(),
        })
    }
}

/// Unique identifier for a published event.
///
/// The bus never deduplicates on it; it exists so handlers and logs can
/// correlate deliveries of the same envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new random EventId using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates an EventId from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for correlation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// ID linking related events across a single request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// ID of the event that directly caused this event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
}

/// Transport envelope for events crossing module boundaries.
///
/// Identity is structural: two envelopes with the same type and payload
/// describe the same fact, whatever their `event_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique ID for this envelope.
    pub event_id: EventId,

    /// Event type for routing (e.g., "auth.user_registered").
    pub event_type: String,

    /// When the event occurred.
    pub occurred_at: Timestamp,

    /// Event-specific payload as JSON.
    pub payload: JsonValue,

    /// Correlation metadata.
    pub metadata: EventMetadata,
}

impl EventEnvelope {
    /// Creates a new EventEnvelope occurring now.
    pub fn new(event_type: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            event_id: EventId::new(),
            event_type: event_type.into(),
            occurred_at: Timestamp::now(),
            payload,
            metadata: EventMetadata::default(),
        }
    }

    /// Returns the owning domain, i.e. the part of the event type before the
    /// first dot.
    pub fn domain(&self) -> &str {
        self.event_type
            .split_once('.')
            .map(|(domain, _)| domain)
            .unwrap_or(&self.event_type)
    }

    /// Add correlation ID for request tracing.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.correlation_id = Some(id.into());
        self
    }

    /// Add causation ID (ID of event that caused this one).
    pub fn with_causation_id(mut self, id: impl Into<String>) -> Self {
        self.metadata.causation_id = Some(id.into());
        self
    }

    /// Deserialize payload to a specific event type.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, DomainError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            DomainError::new(
                ErrorCode::InvalidEventPayload,
                format!("Malformed {} payload: {}", self.event_type, e),
            )
            .with_detail("event_type", self.event_type.clone())
        })
    }
}
