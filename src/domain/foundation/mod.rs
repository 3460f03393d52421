//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, event envelopes, and error types
//! that every module speaks.

mod errors;
mod events;
mod identifier;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata};
pub use identifier::validate_identifier;
pub use ids::UserId;
pub use timestamp::Timestamp;
