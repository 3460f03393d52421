//! User aggregate of the auth module.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId, ValidationError};

/// A registered user.
///
/// Only the shape other modules rely on lives here; credential handling is
/// outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub registered_at: Timestamp,
}

impl User {
    /// Creates a new user with a fresh id. Email is trimmed and lower-cased.
    pub fn register(
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let email = email.into().trim().to_lowercase();
        let display_name = display_name.into().trim().to_string();

        if email.is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if display_name.is_empty() {
            return Err(ValidationError::empty_field("display_name"));
        }

        Ok(Self {
            id: UserId::new(),
            email,
            display_name,
            registered_at: Timestamp::now(),
        })
    }
}
