//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, plus the
//! event handlers modules subscribe to each other's events with.

pub mod auth;
pub mod profile;

pub use auth::{
    DeleteUserCommand, DeleteUserHandler, DeleteUserResult, RegisterUserCommand,
    RegisterUserHandler, RegisterUserResult,
};
pub use profile::{GetProfileHandler, GetProfileQuery, ProfileProjection, PROFILE_PROJECTION_EVENTS};
