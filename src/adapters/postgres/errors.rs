//! Mapping of sqlx errors onto domain error codes.

use sqlx::error::DatabaseError;

use crate::domain::foundation::{DomainError, ErrorCode};

const UNIQUE_VIOLATION: &str = "23505";
const DUPLICATE_TABLE: &str = "42P07";
const DUPLICATE_SCHEMA: &str = "42P06";

/// Converts a sqlx error into a `DomainError`, prefixing `context`.
///
/// Pool exhaustion, a closed pool and transport failures become
/// `CONNECTION_UNAVAILABLE`; everything reported by the server becomes
/// `DATABASE_ERROR` with `sqlstate` and `constraint` details when present.
pub(crate) fn map_sqlx_error(context: &str, err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::PoolTimedOut => DomainError::new(
            ErrorCode::ConnectionUnavailable,
            format!("{}: timed out waiting for a pooled connection", context),
        ),
        sqlx::Error::PoolClosed => DomainError::new(
            ErrorCode::ConnectionUnavailable,
            format!("{}: connection pool is closed", context),
        ),
        sqlx::Error::Io(e) => DomainError::new(
            ErrorCode::ConnectionUnavailable,
            format!("{}: {}", context, e),
        ),
        sqlx::Error::Tls(e) => DomainError::new(
            ErrorCode::ConnectionUnavailable,
            format!("{}: {}", context, e),
        ),
        sqlx::Error::Database(db_err) => from_database_error(context, db_err.as_ref()),
        other => DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, other)),
    }
}

fn from_database_error(context: &str, db_err: &dyn DatabaseError) -> DomainError {
    let mut error = DomainError::new(
        ErrorCode::DatabaseError,
        format!("{}: {}", context, db_err.message()),
    );
    if let Some(code) = db_err.code() {
        error = error.with_detail("sqlstate", code.to_string());
    }
    if let Some(constraint) = db_err.constraint() {
        error = error.with_detail("constraint", constraint);
    }
    error
}

/// True if the error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &DomainError) -> bool {
    err.detail("sqlstate") == Some(UNIQUE_VIOLATION)
}

/// True if a conditional `CREATE` lost a race against a concurrent creator.
///
/// `IF NOT EXISTS` is not atomic in PostgreSQL: two sessions can both decide
/// the object is missing, and the loser fails on the catalog's unique index.
pub(crate) fn is_lost_creation_race(err: &DomainError) -> bool {
    matches!(
        err.detail("sqlstate"),
        Some(UNIQUE_VIOLATION) | Some(DUPLICATE_TABLE) | Some(DUPLICATE_SCHEMA)
    )
}
