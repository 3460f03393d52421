//! Migration module - per-module schema evolution.
//!
//! Each module owns an ordered list of named migrations. The registry fixes
//! the global apply order; the runner (application layer) applies what the
//! ledger does not list yet.

mod migration;
mod registry;

pub use migration::{AppliedMigration, DomainMigrations, Migration, MigrationKey, MigrationReport};
pub use registry::MigrationRegistry;
