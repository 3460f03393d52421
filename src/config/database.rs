//! Connection pool settings for the shared PostgreSQL database
//!
//! Every module, the migration runner and the transaction coordinator draw
//! from one pool, so `max_connections` bounds the number of concurrent
//! transactions across the whole process.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound on `max_connections`. PostgreSQL defaults to 100 server-side.
const POOL_CEILING: u32 = 100;

/// Pool configuration, read from `MODULITH__DATABASE__*`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` or `postgresql://` URL
    pub url: String,

    /// Connections kept open while idle
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Size of the shared pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a query or `run` waits for a free connection before failing
    /// with `CONNECTION_UNAVAILABLE`
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle connections above `min_connections` are closed after this; 0 keeps them
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Connections are recycled after this; 0 keeps them for the pool's lifetime
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        non_zero_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Option<Duration> {
        non_zero_secs(self.max_lifetime_secs)
    }

    /// Checks the URL scheme and that the pool can hand out a connection.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.url.split_once("://") {
            _ if self.url.is_empty() => {
                return Err(ValidationError::MissingRequired("MODULITH__DATABASE__URL"))
            }
            Some(("postgres" | "postgresql", rest)) if !rest.is_empty() => {}
            _ => return Err(ValidationError::InvalidDatabaseUrl),
        }

        if self.max_connections == 0 || self.min_connections > self.max_connections {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.max_connections > POOL_CEILING {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        // A zero acquire timeout fails every checkout under the slightest contention.
        if self.acquire_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
        }
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_max_lifetime() -> u64 {
    1800
}
