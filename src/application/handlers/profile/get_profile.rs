//! GetProfile - Query handler for a user's profile.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::profile::Profile;
use crate::ports::{ProfileRepository, QueryExecutor};

/// Query for one user's profile.
#[derive(Debug, Clone)]
pub struct GetProfileQuery {
    pub user_id: UserId,
}

/// Handler for reading profiles.
pub struct GetProfileHandler {
    executor: Arc<dyn QueryExecutor>,
    profiles: Arc<dyn ProfileRepository>,
}

impl GetProfileHandler {
    pub fn new(executor: Arc<dyn QueryExecutor>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { executor, profiles }
    }

    pub async fn handle(&self, query: GetProfileQuery) -> Result<Profile, DomainError> {
        self.profiles
            .find_by_user(self.executor.as_ref(), &query.user_id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::UserNotFound,
                    format!("No profile for user {}", query.user_id),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{QueryResult, SqlParam};
    use async_trait::async_trait;
    use serde_json::json;

    /// Executor that answers every query with one canned row.
    struct CannedExecutor(Option<serde_json::Value>);

    #[async_trait]
    impl QueryExecutor for CannedExecutor {
        async fn query(&self, _sql: &str, _params: &[SqlParam]) -> Result<QueryResult, DomainError> {
            let rows: Vec<_> = self
                .0
                .iter()
                .filter_map(|v| v.as_object().cloned())
                .collect();
            Ok(QueryResult {
                row_count: rows.len() as u64,
                rows,
            })
        }
    }

    fn handler(row: Option<serde_json::Value>) -> GetProfileHandler {
        GetProfileHandler::new(
            Arc::new(CannedExecutor(row)),
            Arc::new(crate::adapters::postgres::PostgresProfileRepository::new("profiles").unwrap()),
        )
    }

    #[tokio::test]
    async fn returns_stored_profile() {
        let user_id = UserId::new();
        let handler = handler(Some(json!({
            "user_id": user_id.to_string(),
            "display_name": "Ada",
            "created_at": "2024-01-15T10:30:00Z",
        })));

        let profile = handler.handle(GetProfileQuery { user_id }).await.unwrap();

        assert_eq!(profile.user_id, user_id);
        assert_eq!(profile.display_name, "Ada");
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let handler = handler(None);

        let err = handler
            .handle(GetProfileQuery { user_id: UserId::new() })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::UserNotFound);
    }
}
