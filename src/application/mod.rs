//! Application layer - Commands, queries, migrations and module wiring.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod backbone;
pub mod handlers;
pub mod migration_runner;
pub mod modules;

pub use backbone::Backbone;
pub use migration_runner::MigrationRunner;
pub use modules::{ModuleContext, ModuleParts};
