//! Typed view over the events that cross module boundaries.
//!
//! The bus routes untyped envelopes by their type string. Handlers decode them
//! through [`ModuleEvent`] so that every known tag maps to exactly one payload
//! shape, while tags this build does not know survive as
//! [`ModuleEvent::Unknown`] instead of failing.

use serde_json::Value as JsonValue;

use crate::domain::auth::{UserDeleted, UserRegistered, USER_DELETED, USER_REGISTERED};
use crate::domain::foundation::{DomainError, DomainEvent, EventEnvelope};

/// Every event type known to this build, plus a forward-compatible fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleEvent {
    UserRegistered(UserRegistered),
    UserDeleted(UserDeleted),
    Unknown {
        event_type: String,
        payload: JsonValue,
    },
}

impl ModuleEvent {
    /// Decodes an envelope.
    ///
    /// A known tag with a payload that does not match its shape is an error
    /// (`INVALID_EVENT_PAYLOAD`); an unknown tag is not.
    pub fn from_envelope(envelope: &EventEnvelope) -> Result<Self, DomainError> {
        match envelope.event_type.as_str() {
            USER_REGISTERED => envelope.payload_as().map(ModuleEvent::UserRegistered),
            USER_DELETED => envelope.payload_as().map(ModuleEvent::UserDeleted),
            other => Ok(ModuleEvent::Unknown {
                event_type: other.to_string(),
                payload: envelope.payload.clone(),
            }),
        }
    }

    pub fn event_type(&self) -> &str {
        match self {
            ModuleEvent::UserRegistered(e) => e.event_type(),
            ModuleEvent::UserDeleted(e) => e.event_type(),
            ModuleEvent::Unknown { event_type, .. } => event_type,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ModuleEvent::Unknown { .. })
    }
}
