//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field } => field,
            ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    InvalidEventPayload,

    // Not found / conflict errors
    UserNotFound,
    EmailTaken,

    // Connection errors
    NotConnected,
    ConnectionUnavailable,

    // Migration errors
    DuplicateMigration,
    MigrationFailed,

    // Transaction errors
    TransactionFailed,
    TransactionClosed,

    // Event bus errors
    HandlerFailed,

    // Infrastructure errors
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidEventPayload => "INVALID_EVENT_PAYLOAD",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::EmailTaken => "EMAIL_TAKEN",
            ErrorCode::NotConnected => "NOT_CONNECTED",
            ErrorCode::ConnectionUnavailable => "CONNECTION_UNAVAILABLE",
            ErrorCode::DuplicateMigration => "DUPLICATE_MIGRATION",
            ErrorCode::MigrationFailed => "MIGRATION_FAILED",
            ErrorCode::TransactionFailed => "TRANSACTION_FAILED",
            ErrorCode::TransactionClosed => "TRANSACTION_CLOSED",
            ErrorCode::HandlerFailed => "HANDLER_FAILED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, optional details and causes.
///
/// `causes` holds the underlying failures when one error summarizes several
/// (all failed handlers of a publish) or wraps another (the SQL error behind a
/// failed migration).
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
    pub causes: Vec<DomainError>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
            causes: Vec::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Creates an error that summarizes several underlying failures.
    pub fn aggregate(
        code: ErrorCode,
        message: impl Into<String>,
        causes: Vec<DomainError>,
    ) -> Self {
        Self {
            causes,
            ..Self::new(code, message)
        }
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Attaches an underlying cause.
    pub fn with_cause(mut self, cause: DomainError) -> Self {
        self.causes.push(cause);
        self
    }

    /// Returns the value of a detail, if present.
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.causes.first().map(|cause| cause as &(dyn Error + 'static))
    }
}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        DomainError::validation(err.field().to_string(), err.to_string())
    }
}
