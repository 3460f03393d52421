//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `MODULITH` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use modulith::config::AppConfig;
//!
//! let config = AppConfig::load_validated().expect("Invalid configuration");
//!
//! println!("Ledger table: {}", config.migrations.ledger_table);
//! ```

mod database;
mod error;
mod logging;
mod migrations;
mod modules;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;
pub use migrations::MigrationsConfig;
pub use modules::{AuthModuleConfig, ModulesConfig, ProfilesModuleConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration (PostgreSQL connection pool)
    pub database: DatabaseConfig,

    /// Logging configuration (filter, output format)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Migration configuration (startup behaviour, ledger table)
    #[serde(default)]
    pub migrations: MigrationsConfig,

    /// Per-module configuration (schemas)
    #[serde(default)]
    pub modules: ModulesConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `MODULITH` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `MODULITH__DATABASE__URL=...` -> `database.url = ...`
    /// - `MODULITH__MODULES__AUTH__SCHEMA=accounts` -> `modules.auth.schema = accounts`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MODULITH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load and validate in one step, as the binary does at startup.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.database.validate()?;
        self.logging.validate()?;
        self.migrations.validate()?;
        self.modules.validate()?;
        Ok(())
    }
}
