//! Auth module command handlers.

mod delete_user;
mod register_user;

pub use delete_user::{DeleteUserCommand, DeleteUserHandler, DeleteUserResult};
pub use register_user::{RegisterUserCommand, RegisterUserHandler, RegisterUserResult};
