//! Per-module configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::foundation::validate_identifier;

/// Configuration of the bundled modules
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModulesConfig {
    #[serde(default)]
    pub auth: AuthModuleConfig,

    #[serde(default)]
    pub profiles: ProfilesModuleConfig,
}

/// Auth module configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthModuleConfig {
    /// Schema holding the module's tables
    #[serde(default = "default_auth_schema")]
    pub schema: String,
}

/// Profiles module configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProfilesModuleConfig {
    /// Schema holding the module's tables
    #[serde(default = "default_profiles_schema")]
    pub schema: String,
}

impl ModulesConfig {
    /// Validate module configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        plain_schema(&self.auth.schema)?;
        plain_schema(&self.profiles.schema)?;
        if self.auth.schema == self.profiles.schema {
            return Err(ValidationError::SharedSchema(
                "auth",
                "profiles",
                self.auth.schema.clone(),
            ));
        }
        Ok(())
    }
}

fn plain_schema(schema: &str) -> Result<(), ValidationError> {
    if schema.contains('.') {
        return Err(ValidationError::InvalidIdentifier(format!(
            "schema '{}' must not be qualified",
            schema
        )));
    }
    validate_identifier("schema", schema).map_err(|e| ValidationError::InvalidIdentifier(e.to_string()))
}

impl Default for AuthModuleConfig {
    fn default() -> Self {
        Self {
            schema: default_auth_schema(),
        }
    }
}

impl Default for ProfilesModuleConfig {
    fn default() -> Self {
        Self {
            schema: default_profiles_schema(),
        }
    }
}

fn default_auth_schema() -> String {
    "auth".to_string()
}

fn default_profiles_schema() -> String {
    "profiles".to_string()
}
