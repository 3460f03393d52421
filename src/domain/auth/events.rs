//! Events published by the auth module.

use serde::{Deserialize, Serialize};

use super::User;
use crate::domain::foundation::{DomainEvent, Timestamp, UserId};

pub const USER_REGISTERED: &str = "auth.user_registered";
pub const USER_DELETED: &str = "auth.user_deleted";

/// A user account was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRegistered {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
    pub registered_at: Timestamp,
}

impl From<&User> for UserRegistered {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            registered_at: user.registered_at,
        }
    }
}

impl DomainEvent for UserRegistered {
    fn event_type(&self) -> &'static str {
        USER_REGISTERED
    }

    fn occurred_at(&self) -> Timestamp {
        self.registered_at
    }
}

/// A user account was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDeleted {
    pub user_id: UserId,
    pub deleted_at: Timestamp,
}

impl DomainEvent for UserDeleted {
    fn event_type(&self) -> &'static str {
        USER_DELETED
    }

    fn occurred_at(&self) -> Timestamp {
        self.deleted_at
    }
}
