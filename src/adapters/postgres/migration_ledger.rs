//! PostgreSQL-backed migration ledger.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::errors::is_lost_creation_race;
use crate::domain::foundation::{validate_identifier, DomainError};
use crate::domain::migration::{AppliedMigration, MigrationKey};
use crate::ports::{MigrationLedger, QueryExecutor};

/// Ledger stored in a table shaped
/// `(id, domain, name, executed_at, UNIQUE (domain, name))`.
///
/// The table name may be schema-qualified; the schema is created on
/// `initialize` if missing.
pub struct PostgresMigrationLedger {
    executor: Arc<dyn QueryExecutor>,
    table: String,
}

#[derive(Deserialize)]
struct Exists {
    applied: bool,
}

impl PostgresMigrationLedger {
    pub fn new(executor: Arc<dyn QueryExecutor>, table: impl Into<String>) -> Result<Self, DomainError> {
        let table = table.into();
        validate_identifier("ledger_table", &table)?;
        Ok(Self { executor, table })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    async fn create_idempotently(&self, sql: &str) -> Result<(), DomainError> {
        match self.executor.query(sql, &[]).await {
            Ok(_) => Ok(()),
            Err(e) if is_lost_creation_race(&e) => {
                debug!(table = %self.table, "Ledger created concurrently by another runner");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl MigrationLedger for PostgresMigrationLedger {
    async fn initialize(&self) -> Result<(), DomainError> {
        if let Some((schema, _)) = self.table.split_once('.') {
            self.create_idempotently(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema))
                .await?;
        }

        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                domain TEXT NOT NULL,
                name TEXT NOT NULL,
                executed_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                UNIQUE (domain, name)
            )
            "#,
            self.table
        );
        self.create_idempotently(&sql).await
    }

    async fn is_applied(&self, key: &MigrationKey) -> Result<bool, DomainError> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE domain = $1 AND name = $2) AS applied",
            self.table
        );
        let result = self
            .executor
            .query(&sql, &[key.domain.as_str().into(), key.name.as_str().into()])
            .await?;

        Ok(result
            .decode_first::<Exists>()?
            .map(|row| row.applied)
            .unwrap_or(false))
    }

    async fn record_applied(&self, key: &MigrationKey) -> Result<bool, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO {} (domain, name, executed_at)
            VALUES ($1, $2, now())
            ON CONFLICT (domain, name) DO NOTHING
            "#,
            self.table
        );
        let result = self
            .executor
            .query(&sql, &[key.domain.as_str().into(), key.name.as_str().into()])
            .await?;

        Ok(result.row_count == 1)
    }

    async fn applied(&self) -> Result<Vec<AppliedMigration>, DomainError> {
        let sql = format!(
            "SELECT domain, name, executed_at FROM {} ORDER BY id",
            self.table
        );
        self.executor.query(&sql, &[]).await?.decode()
    }

    async fn forget_domain(&self, domain: &str) -> Result<u64, DomainError> {
        let sql = format!("DELETE FROM {} WHERE domain = $1", self.table);
        let result = self.executor.query(&sql, &[domain.into()]).await?;
        Ok(result.row_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::ports::{QueryResult, SqlParam};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingExecutor {
        statements: Mutex<Vec<String>>,
        fail_with: Option<DomainError>,
    }

    #[async_trait]
    impl QueryExecutor for RecordingExecutor {
        async fn query(&self, sql: &str, _params: &[SqlParam]) -> Result<QueryResult, DomainError> {
            self.statements.lock().unwrap().push(sql.to_string());
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(QueryResult::default()),
            }
        }
    }

    #[test]
    fn rejects_unsafe_table_name() {
        let exec = Arc::new(RecordingExecutor::default());
        let result = PostgresMigrationLedger::new(exec, "migrations; DROP TABLE x");

        assert_eq!(result.err().map(|e| e.code), Some(ErrorCode::ValidationFailed));
    }

    #[tokio::test]
    async fn initialize_creates_schema_for_qualified_table() {
        let exec = Arc::new(RecordingExecutor::default());
        let ledger = PostgresMigrationLedger::new(exec.clone(), "meta._migrations").unwrap();

        ledger.initialize().await.unwrap();

        let statements = exec.statements.lock().unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("CREATE SCHEMA IF NOT EXISTS meta"));
        assert!(statements[1].contains("UNIQUE (domain, name)"));
    }

    #[tokio::test]
    async fn initialize_tolerates_lost_creation_race() {
        let exec = Arc::new(RecordingExecutor {
            fail_with: Some(
                DomainError::new(ErrorCode::DatabaseError, "duplicate key")
                    .with_detail("sqlstate", "23505"),
            ),
            ..Default::default()
        });
        let ledger = PostgresMigrationLedger::new(exec, "_migrations").unwrap();

        assert!(ledger.initialize().await.is_ok());
    }

    #[tokio::test]
    async fn initialize_propagates_other_failures() {
        let exec = Arc::new(RecordingExecutor {
            fail_with: Some(
                DomainError::new(ErrorCode::DatabaseError, "permission denied")
                    .with_detail("sqlstate", "42501"),
            ),
            ..Default::default()
        });
        let ledger = PostgresMigrationLedger::new(exec, "_migrations").unwrap();

        assert!(ledger.initialize().await.is_err());
    }

    #[tokio::test]
    async fn empty_exists_result_means_not_applied() {
        let exec = Arc::new(RecordingExecutor::default());
        let ledger = PostgresMigrationLedger::new(exec, "_migrations").unwrap();

        let applied = ledger.is_applied(&MigrationKey::new("x", "000")).await.unwrap();
        assert!(!applied);
    }
}
