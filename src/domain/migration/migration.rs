//! Migration value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Natural key of a migration: unique across a registry's lifetime and in the
/// ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MigrationKey {
    pub domain: String,
    pub name: String,
}

impl MigrationKey {
    pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for MigrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.name)
    }
}

/// One named schema change owned by a module.
///
/// `up` statements run in order when the migration is applied. `down` is kept
/// for administrative rollback tooling and is never executed by the runner.
/// Statements should be safe to re-run (`IF NOT EXISTS` guards): a run that
/// fails half-way through `up` retries the whole batch next time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    key: MigrationKey,
    up: Vec<String>,
    down: Vec<String>,
}

impl Migration {
    /// Creates a migration, rejecting empty domain or name.
    pub fn new<I, S>(
        domain: impl Into<String>,
        name: impl Into<String>,
        up: I,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domain = domain.into();
        let name = name.into();

        if domain.trim().is_empty() {
            return Err(ValidationError::empty_field("domain"));
        }
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }

        Ok(Self {
            key: MigrationKey { domain, name },
            up: up.into_iter().map(Into::into).collect(),
            down: Vec::new(),
        })
    }

    /// Sets the statements that revert this migration.
    pub fn with_down<I, S>(mut self, down: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.down = down.into_iter().map(Into::into).collect();
        self
    }

    pub fn key(&self) -> &MigrationKey {
        &self.key
    }

    pub fn domain(&self) -> &str {
        &self.key.domain
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn up(&self) -> &[String] {
        &self.up
    }

    pub fn down(&self) -> &[String] {
        &self.down
    }
}

/// A module's ordered migration list, as handed to the registry.
#[derive(Debug, Clone)]
pub struct DomainMigrations {
    pub domain: String,
    pub migrations: Vec<Migration>,
}

impl DomainMigrations {
    pub fn new(domain: impl Into<String>, migrations: Vec<Migration>) -> Self {
        Self {
            domain: domain.into(),
            migrations,
        }
    }
}

/// A row of the migration ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedMigration {
    pub domain: String,
    pub name: String,
    pub executed_at: Timestamp,
}

impl AppliedMigration {
    pub fn key(&self) -> MigrationKey {
        MigrationKey::new(self.domain.clone(), self.name.clone())
    }
}

/// Outcome of one `run_all` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Migrations whose `up` batch ran during this pass, in apply order.
    pub applied: Vec<MigrationKey>,
    /// Migrations the ledger already listed.
    pub skipped: Vec<MigrationKey>,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}
