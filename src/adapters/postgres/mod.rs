//! PostgreSQL adapters.
//!
//! - `Database` - Pooled connection lifecycle, the root `QueryExecutor`
//! - `TransactionCoordinator` / `TransactionScope` - Transaction boundary
//! - `PostgresMigrationLedger` - Applied-migration bookkeeping
//! - `PostgresUserRepository`, `PostgresProfileRepository` - Module storage

mod database;
mod errors;
mod migration_ledger;
mod profile_repository;
mod row;
mod transaction;
mod user_repository;

pub use database::Database;
pub use migration_ledger::PostgresMigrationLedger;
pub use profile_repository::PostgresProfileRepository;
pub use transaction::{TransactionCoordinator, TransactionScope};
pub use user_repository::PostgresUserRepository;
