//! Profile module handlers.

mod get_profile;
mod projection;

pub use get_profile::{GetProfileHandler, GetProfileQuery};
pub use projection::{ProfileProjection, PROFILE_PROJECTION_EVENTS};
