//! MigrationLedger port - Persistent record of applied migrations.
//!
//! The ledger is the only source of truth for "already applied". Uniqueness
//! of `(domain, name)` is enforced by the store, which is what keeps
//! concurrent runners from double-recording a migration.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::migration::{AppliedMigration, MigrationKey};

#[async_trait]
pub trait MigrationLedger: Send + Sync {
    /// Creates the ledger storage if missing. Idempotent and safe to race
    /// against other runners.
    async fn initialize(&self) -> Result<(), DomainError>;

    /// Returns `true` if the migration has a ledger row.
    async fn is_applied(&self, key: &MigrationKey) -> Result<bool, DomainError>;

    /// Records a migration as applied.
    ///
    /// Returns `false` when a row already existed (another runner got there
    /// first); that is not an error.
    async fn record_applied(&self, key: &MigrationKey) -> Result<bool, DomainError>;

    /// Lists ledger rows in the order they were recorded.
    async fn applied(&self) -> Result<Vec<AppliedMigration>, DomainError>;

    /// Administrative reset: removes every row of a domain so its migrations
    /// apply again. Returns the number of rows removed.
    async fn forget_domain(&self, domain: &str) -> Result<u64, DomainError>;
}
