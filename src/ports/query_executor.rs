//! QueryExecutor port - Interface for running parameterized SQL.
//!
//! Everything that touches the database goes through this trait: the pooled
//! executor, the transaction-scoped capability handed out by the transaction
//! coordinator, the migration ledger, and module repositories. Code written
//! against `&dyn QueryExecutor` runs unchanged inside or outside a
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};

/// One result row, keyed by column name.
pub type Row = Map<String, JsonValue>;

/// A value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Bound as a text-typed NULL. A placeholder for any other column type
    /// needs a cast in the SQL, e.g. `$2::uuid` for a `None::<UserId>`.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Json(JsonValue),
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(v.into())
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<Uuid> for SqlParam {
    fn from(v: Uuid) -> Self {
        SqlParam::Uuid(v)
    }
}

impl From<UserId> for SqlParam {
    fn from(v: UserId) -> Self {
        SqlParam::Uuid(*v.as_uuid())
    }
}

impl From<DateTime<Utc>> for SqlParam {
    fn from(v: DateTime<Utc>) -> Self {
        SqlParam::Timestamp(v)
    }
}

impl From<Timestamp> for SqlParam {
    fn from(v: Timestamp) -> Self {
        SqlParam::Timestamp(*v.as_datetime())
    }
}

impl From<JsonValue> for SqlParam {
    fn from(v: JsonValue) -> Self {
        SqlParam::Json(v)
    }
}

impl<T: Into<SqlParam>> From<Option<T>> for SqlParam {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlParam::Null)
    }
}

/// Rows returned by a statement and the number of rows it touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub row_count: u64,
}

impl QueryResult {
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Deserializes every row into `T` (field names match column names).
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>, DomainError> {
        self.rows.iter().map(decode_row).collect()
    }

    /// Deserializes the first row, if any.
    pub fn decode_first<T: DeserializeOwned>(&self) -> Result<Option<T>, DomainError> {
        self.rows.first().map(decode_row).transpose()
    }
}

fn decode_row<T: DeserializeOwned>(row: &Row) -> Result<T, DomainError> {
    serde_json::from_value(JsonValue::Object(row.clone())).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Row does not match expected shape: {}", e),
        )
    })
}

/// Port for executing SQL.
///
/// Implementations must be safe for concurrent callers; each call may be
/// served by a different pooled connection unless the implementation is
/// bound to a single transaction.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes one statement with positional parameters.
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<QueryResult, DomainError>;

    /// Executes statements in order without parameters, stopping at the first
    /// failure. The error carries the failing statement's index as the
    /// `statement` detail.
    async fn execute_batch(&self, statements: &[String]) -> Result<(), DomainError> {
        for (index, statement) in statements.iter().enumerate() {
            self.query(statement, &[])
                .await
                .map_err(|e| e.with_detail("statement", index.to_string()))?;
        }
        Ok(())
    }
}
