//! Migration configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::validate_identifier;

/// Migration configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MigrationsConfig {
    /// Apply pending migrations when the backbone starts
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,

    /// Ledger table name, optionally schema-qualified
    #[serde(default = "default_ledger_table")]
    pub ledger_table: String,
}

impl MigrationsConfig {
    /// Validate migration configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_identifier("ledger_table", &self.ledger_table)
            .map_err(|e| ValidationError::InvalidIdentifier(e.to_string()))
    }
}

impl Default for MigrationsConfig {
    fn default() -> Self {
        Self {
            run_on_startup: default_run_on_startup(),
            ledger_table: default_ledger_table(),
        }
    }
}

fn default_run_on_startup() -> bool {
    true
}

fn default_ledger_table() -> String {
    "_migrations".to_string()
}
