//! Parameter binding and row decoding shared by every PostgreSQL executor.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::TryStreamExt;
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Decode, Either, Executor, Postgres, Row as _, Type, TypeInfo};
use uuid::Uuid;

use super::errors::map_sqlx_error;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{QueryResult, Row, SqlParam};

/// Runs one statement on any sqlx executor (pool, connection, transaction)
/// and collects both the returned rows and the affected-row count.
pub(crate) async fn fetch<'e, 'c: 'e, E>(
    executor: E,
    sql: &'e str,
    params: &'e [SqlParam],
) -> Result<QueryResult, DomainError>
where
    E: 'e + Executor<'c, Database = Postgres>,
{
    let mut stream = bind_params(sqlx::query(sql), params).fetch_many(executor);

    let mut rows = Vec::new();
    let mut affected = 0u64;
    while let Some(item) = stream
        .try_next()
        .await
        .map_err(|e| map_sqlx_error("Query failed", e))?
    {
        match item {
            Either::Left(done) => affected += done.rows_affected(),
            Either::Right(row) => rows.push(decode_row(&row)?),
        }
    }

    Ok(QueryResult {
        row_count: affected.max(rows.len() as u64),
        rows,
    })
}

/// Binds parameters in placeholder order.
///
/// `SqlParam::Null` is sent as a text-typed NULL; a placeholder for a
/// non-text column needs an explicit cast (`$3::uuid`).
fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Null => query.bind(None::<&str>),
            SqlParam::Bool(v) => query.bind(*v),
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Float(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.as_str()),
            SqlParam::Uuid(v) => query.bind(*v),
            SqlParam::Timestamp(v) => query.bind(*v),
            SqlParam::Json(v) => query.bind(v),
        };
    }
    query
}

/// Decodes a row into a JSON object keyed by column name.
pub(crate) fn decode_row(row: &PgRow) -> Result<Row, DomainError> {
    let mut decoded = Row::new();

    for col in row.columns() {
        let index = col.ordinal();
        let value = match col.type_info().name() {
            "BOOL" => column::<bool>(row, index),
            "INT2" => column::<i16>(row, index),
            "INT4" => column::<i32>(row, index),
            "INT8" => column::<i64>(row, index),
            "FLOAT4" => column::<f32>(row, index),
            "FLOAT8" => column::<f64>(row, index),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "UNKNOWN" => column::<String>(row, index),
            "UUID" => column::<Uuid>(row, index),
            "TIMESTAMPTZ" => column::<DateTime<Utc>>(row, index),
            "TIMESTAMP" => column::<NaiveDateTime>(row, index),
            "DATE" => column::<NaiveDate>(row, index),
            "JSON" | "JSONB" => column::<JsonValue>(row, index),
            "VOID" => Ok(JsonValue::Null),
            other => Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!(
                    "Column '{}' has unsupported type {}; cast it to a supported type in SQL",
                    col.name(),
                    other
                ),
            )),
        }?;
        decoded.insert(col.name().to_string(), value);
    }

    Ok(decoded)
}

fn column<T>(row: &PgRow, index: usize) -> Result<JsonValue, DomainError>
where
    T: for<'r> Decode<'r, Postgres> + Type<Postgres> + Serialize,
{
    let value: Option<T> = row
        .try_get(index)
        .map_err(|e| map_sqlx_error("Failed to decode column", e))?;

    serde_json::to_value(value).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to convert column {}: {}", index, e),
        )
    })
}
