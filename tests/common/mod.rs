//! Shared helpers for PostgreSQL integration tests.
//!
//! Tests connect to `DATABASE_URL` and return early when it is unset, so
//! `cargo test` passes on machines without a database.

#![allow(dead_code)]

use std::sync::Arc;

use modulith::adapters::postgres::Database;
use modulith::config::DatabaseConfig;
use modulith::ports::QueryExecutor;
use uuid::Uuid;

pub fn database_url() -> Option<String> {
    match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => Some(url),
        _ => {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL integration test");
            None
        }
    }
}

pub fn database_config(url: &str, max_connections: u32) -> DatabaseConfig {
    DatabaseConfig {
        url: url.to_string(),
        min_connections: 0,
        max_connections,
        acquire_timeout_secs: 5,
        ..Default::default()
    }
}

/// Connected database with the given pool size, or `None` to skip.
pub async fn connect(max_connections: u32) -> Option<Arc<Database>> {
    let url = database_url()?;
    let db = Arc::new(Database::from_config(&database_config(&url, max_connections)));
    db.connect(&url).await.expect("connect to DATABASE_URL");
    Some(db)
}

/// Schema name unique to one test run.
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

pub async fn drop_schema(exec: &dyn QueryExecutor, schema: &str) {
    exec.query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", schema), &[])
        .await
        .expect("drop schema");
}

pub async fn table_exists(exec: &dyn QueryExecutor, table: &str) -> bool {
    let result = exec
        .query("SELECT to_regclass($1) IS NOT NULL AS present", &[table.into()])
        .await
        .expect("to_regclass");
    result.rows[0]["present"].as_bool().unwrap_or(false)
}

pub async fn count(exec: &dyn QueryExecutor, table: &str) -> i64 {
    let result = exec
        .query(&format!("SELECT count(*) AS n FROM {}", table), &[])
        .await
        .expect("count rows");
    result.rows[0]["n"].as_i64().unwrap_or(-1)
}
