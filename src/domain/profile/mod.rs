//! Profile module domain - per-user profiles projected from auth events.

mod profile;

pub use profile::Profile;
