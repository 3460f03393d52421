//! Transaction boundary: `run` a unit of work on one connection.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::database::Database;
use super::errors::map_sqlx_error;
use super::row::fetch;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{QueryExecutor, QueryResult, SqlParam};

type TransactionSlot = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// Runs callbacks inside a database transaction.
///
/// Single level only: nested work must be handed the same
/// [`TransactionScope`] rather than calling `run` again.
#[derive(Clone)]
pub struct TransactionCoordinator {
    database: Arc<Database>,
}

impl TransactionCoordinator {
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Begins a transaction, passes its scope to `work`, and commits on `Ok`
    /// or rolls back on `Err`. The callback's error is returned unchanged.
    ///
    /// The connection goes back to the pool on every path. If `work` panics
    /// or the returned future is dropped, the open transaction is rolled back
    /// when the scope is dropped.
    pub async fn run<F, Fut, T, E>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(TransactionScope) -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: From<DomainError> + Send,
    {
        let pool = self.database.pool().await?;
        let tx = pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("Failed to begin transaction", e))?;

        let slot: TransactionSlot = Arc::new(Mutex::new(Some(tx)));
        let failed = Arc::new(AtomicBool::new(false));
        let outcome = work(TransactionScope {
            slot: Arc::clone(&slot),
            failed: Arc::clone(&failed),
        })
        .await;

        let tx = slot.lock().await.take();
        let Some(tx) = tx else {
            return Err(DomainError::new(
                ErrorCode::TransactionClosed,
                "Transaction was closed before the unit of work completed",
            )
            .into());
        };

        match outcome {
            // PostgreSQL aborts the transaction after a failed statement and
            // turns a later COMMIT into a silent ROLLBACK.
            Ok(_) if failed.load(Ordering::Acquire) => {
                if let Err(e) = tx.rollback().await {
                    warn!(error = %e, "Rollback failed, connection will be discarded");
                }
                Err(DomainError::new(
                    ErrorCode::TransactionFailed,
                    "A statement failed inside the transaction; nothing was committed",
                )
                .into())
            }
            Ok(value) => {
                tx.commit().await.map_err(|e| {
                    DomainError::new(ErrorCode::TransactionFailed, "Failed to commit transaction")
                        .with_cause(map_sqlx_error("Commit failed", e))
                })?;
                debug!("Transaction committed");
                Ok(value)
            }
            Err(err) => {
                match tx.rollback().await {
                    Ok(()) => debug!("Transaction rolled back"),
                    Err(e) => warn!(error = %e, "Rollback failed, connection will be discarded"),
                }
                Err(err)
            }
        }
    }
}

/// Query capability bound to one open transaction.
///
/// Owned by the `run` callback. Once `run` commits or rolls back, every
/// further query fails with `TRANSACTION_CLOSED`. A failed query marks the
/// transaction as aborted, so `run` rolls back even if the callback recovers.
pub struct TransactionScope {
    slot: TransactionSlot,
    failed: Arc<AtomicBool>,
}

impl TransactionScope {
    pub async fn is_open(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}

#[async_trait]
impl QueryExecutor for TransactionScope {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<QueryResult, DomainError> {
        let mut guard = self.slot.lock().await;
        let tx = guard.as_mut().ok_or_else(|| {
            DomainError::new(
                ErrorCode::TransactionClosed,
                "Transaction has already been committed or rolled back",
            )
        })?;
        let result = fetch(&mut **tx, sql, params).await;
        if result.is_err() {
            self.failed.store(true, Ordering::Release);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    #[tokio::test]
    async fn run_before_connect_fails_not_connected() {
        let db = Arc::new(Database::from_config(&DatabaseConfig::default()));
        let coordinator = TransactionCoordinator::new(db);
        let mut called = false;

        let result: Result<(), DomainError> = coordinator
            .run(|_tx| {
                called = true;
                async { Ok(()) }
            })
            .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::NotConnected);
        assert!(!called);
    }

    #[tokio::test]
    async fn closed_scope_rejects_queries() {
        let scope = TransactionScope {
            slot: Arc::new(Mutex::new(None)),
            failed: Arc::new(AtomicBool::new(false)),
        };

        assert!(!scope.is_open().await);
        let err = scope.query("SELECT 1", &[]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TransactionClosed);
    }
}
