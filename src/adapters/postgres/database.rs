//! Pooled PostgreSQL connection lifecycle.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::errors::map_sqlx_error;
use super::row::fetch;
use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{QueryExecutor, QueryResult, SqlParam};

/// Connection pool with an explicit connect/disconnect lifecycle.
///
/// `connect` is idempotent while connected. Queries issued before `connect`
/// (or after `disconnect`) fail with `NOT_CONNECTED`. Callers beyond the
/// pool's capacity queue until the acquire timeout, then fail with
/// `CONNECTION_UNAVAILABLE`.
pub struct Database {
    options: PgPoolOptions,
    pool: RwLock<Option<PgPool>>,
}

impl Database {
    pub fn new(options: PgPoolOptions) -> Self {
        Self {
            options,
            pool: RwLock::new(None),
        }
    }

    /// Builds an unconnected database from pool settings.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        let options = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime());
        Self::new(options)
    }

    /// Opens the pool. Does nothing if already connected.
    pub async fn connect(&self, url: &str) -> Result<(), DomainError> {
        let mut slot = self.pool.write().await;
        if slot.is_some() {
            debug!("Database already connected");
            return Ok(());
        }

        let pool = self
            .options
            .clone()
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("Failed to connect to database", e))?;

        info!(
            max_connections = pool.options().get_max_connections(),
            "Connected to database"
        );
        *slot = Some(pool);
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.pool.read().await.is_some()
    }

    /// Returns a handle to the live pool.
    pub async fn pool(&self) -> Result<PgPool, DomainError> {
        self.pool.read().await.clone().ok_or_else(|| {
            DomainError::new(
                ErrorCode::NotConnected,
                "Database is not connected; call connect first",
            )
        })
    }

    /// Closes the pool, waiting for checked-out connections to return.
    /// Safe to call repeatedly.
    pub async fn disconnect(&self) {
        let pool = self.pool.write().await.take();
        if let Some(pool) = pool {
            pool.close().await;
            info!("Disconnected from database");
        }
    }
}

#[async_trait]
impl QueryExecutor for Database {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<QueryResult, DomainError> {
        let pool = self.pool().await?;
        fetch(&pool, sql, params).await
    }
}
