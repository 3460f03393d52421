//! MigrationRunner - Applies registered migrations the ledger has not seen.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::migration::{
    AppliedMigration, DomainMigrations, Migration, MigrationKey, MigrationRegistry, MigrationReport,
};
use crate::ports::{MigrationLedger, QueryExecutor};

/// Applies migrations in registry order, recording each in the ledger.
///
/// Applying is idempotent: a migration listed in the ledger is skipped, so
/// repeated `run_all` calls apply each migration at most once. A failing
/// `up` batch aborts the run before it is recorded; the next run resumes
/// at that migration.
pub struct MigrationRunner {
    registry: MigrationRegistry,
    ledger: Arc<dyn MigrationLedger>,
    executor: Arc<dyn QueryExecutor>,
}

impl MigrationRunner {
    pub fn new(ledger: Arc<dyn MigrationLedger>, executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            registry: MigrationRegistry::new(),
            ledger,
            executor,
        }
    }

    /// Appends a module's migrations after those already registered.
    pub fn register_domain(&mut self, group: DomainMigrations) -> Result<(), DomainError> {
        let domain = group.domain.clone();
        let count = group.migrations.len();
        self.registry.register_domain(group)?;
        debug!(domain = %domain, count, "Registered migrations");
        Ok(())
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    /// Creates the ledger if it does not exist.
    pub async fn initialize(&self) -> Result<(), DomainError> {
        self.ledger.initialize().await
    }

    /// Applies every pending migration in order.
    pub async fn run_all(&self) -> Result<MigrationReport, DomainError> {
        self.initialize().await?;

        let mut report = MigrationReport::default();
        for migration in self.registry.iter() {
            let key = migration.key();
            if self.ledger.is_applied(key).await? {
                debug!(migration = %key, "Migration already applied, skipping");
                report.skipped.push(key.clone());
                continue;
            }

            self.apply(migration).await?;
            report.applied.push(key.clone());
        }

        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len(),
            "Migration run complete"
        );
        Ok(report)
    }

    /// Keys `run_all` would apply now, in apply order.
    pub async fn pending(&self) -> Result<Vec<MigrationKey>, DomainError> {
        self.initialize().await?;

        let mut pending = Vec::new();
        for migration in self.registry.iter() {
            if !self.ledger.is_applied(migration.key()).await? {
                pending.push(migration.key().clone());
            }
        }
        Ok(pending)
    }

    pub async fn applied(&self) -> Result<Vec<AppliedMigration>, DomainError> {
        self.ledger.applied().await
    }

    /// Drops a domain's ledger rows so its migrations apply again. Used after
    /// the domain's schema has been dropped by hand.
    pub async fn forget_domain(&self, domain: &str) -> Result<u64, DomainError> {
        let removed = self.ledger.forget_domain(domain).await?;
        info!(domain, removed, "Forgot applied migrations");
        Ok(removed)
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DomainError> {
        let key = migration.key();

        self.executor
            .execute_batch(migration.up())
            .await
            .map_err(|e| failure(key, "up statements failed", e))?;

        let inserted = self
            .ledger
            .record_applied(key)
            .await
            .map_err(|e| failure(key, "could not be recorded", e))?;
        if !inserted {
            debug!(migration = %key, "Migration recorded concurrently by another runner");
        }

        info!(migration = %key, statements = migration.up().len(), "Applied migration");
        Ok(())
    }
}

fn failure(key: &MigrationKey, what: &str, cause: DomainError) -> DomainError {
    let mut err = DomainError::new(
        ErrorCode::MigrationFailed,
        format!("Migration {} {}: {}", key, what, cause.message),
    )
    .with_detail("domain", key.domain.clone())
    .with_detail("name", key.name.clone());

    if let Some(statement) = cause.detail("statement") {
        err = err.with_detail("statement", statement.to_string());
    }
    err.with_cause(cause)
}
