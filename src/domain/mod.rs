//! Domain layer containing domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, timestamps, event envelopes, errors)
//! - `migration` - Migration values and the registration-order registry
//! - `catalog` - Typed sum over the events modules exchange
//! - `auth` - User accounts and their events
//! - `profile` - Profiles projected from auth events

pub mod auth;
pub mod catalog;
pub mod foundation;
pub mod migration;
pub mod profile;
