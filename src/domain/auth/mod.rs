//! Auth module domain - user accounts and their lifecycle events.

mod events;
mod user;

pub use events::{UserDeleted, UserRegistered, USER_DELETED, USER_REGISTERED};
pub use user::User;
