//! Registration order of every module's migrations.

use std::collections::HashSet;

use super::{DomainMigrations, Migration, MigrationKey};
use crate::domain::foundation::{DomainError, ErrorCode};

/// Ordered collection of migrations contributed by modules.
///
/// Domains apply in the order they were registered (the composition root
/// decides it); migrations within a domain apply in their declared order.
/// `(domain, name)` is unique for the registry's whole lifetime.
#[derive(Debug, Clone, Default)]
pub struct MigrationRegistry {
    groups: Vec<DomainMigrations>,
    keys: HashSet<MigrationKey>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a domain's migrations to the registration order.
    ///
    /// The whole group is rejected, leaving the registry untouched, if any
    /// migration belongs to another domain or reuses a registered key.
    pub fn register_domain(&mut self, group: DomainMigrations) -> Result<(), DomainError> {
        if group.domain.trim().is_empty() {
            return Err(DomainError::validation("domain", "Domain name cannot be empty"));
        }

        let mut incoming = HashSet::with_capacity(group.migrations.len());
        for migration in &group.migrations {
            if migration.domain() != group.domain {
                return Err(DomainError::validation(
                    "domain",
                    format!(
                        "Migration '{}' declares domain '{}' but was registered under '{}'",
                        migration.name(),
                        migration.domain(),
                        group.domain
                    ),
                ));
            }

            let key = migration.key().clone();
            if self.keys.contains(&key) || !incoming.insert(key.clone()) {
                return Err(DomainError::new(
                    ErrorCode::DuplicateMigration,
                    format!("Migration {} is already registered", key),
                )
                .with_detail("domain", key.domain)
                .with_detail("name", key.name));
            }
        }

        self.keys.extend(incoming);
        self.groups.push(group);
        Ok(())
    }

    /// Iterates every migration in apply order.
    pub fn iter(&self) -> impl Iterator<Item = &Migration> {
        self.groups.iter().flat_map(|group| group.migrations.iter())
    }

    /// Domains in registration order (repeated if registered more than once).
    pub fn domains(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.domain.as_str()).collect()
    }

    pub fn contains(&self, key: &MigrationKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
