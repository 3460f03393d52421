//! PostgreSQL implementation of ProfileRepository.

use async_trait::async_trait;

use crate::domain::foundation::{validate_identifier, DomainError, UserId};
use crate::domain::profile::Profile;
use crate::ports::{ProfileRepository, QueryExecutor};

/// Profiles stored in `<schema>.profiles`, keyed by user id.
pub struct PostgresProfileRepository {
    schema: String,
}

impl PostgresProfileRepository {
    pub fn new(schema: impl Into<String>) -> Result<Self, DomainError> {
        let schema = schema.into();
        validate_identifier("schema", &schema)?;
        Ok(Self { schema })
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn create_if_absent(
        &self,
        exec: &dyn QueryExecutor,
        profile: &Profile,
    ) -> Result<bool, DomainError> {
        // Redelivered registrations land here; the first insert wins.
        let sql = format!(
            r#"
            INSERT INTO {}.profiles (user_id, display_name, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO NOTHING
            "#,
            self.schema
        );

        let result = exec
            .query(
                &sql,
                &[
                    profile.user_id.into(),
                    profile.display_name.as_str().into(),
                    profile.created_at.into(),
                ],
            )
            .await?;

        Ok(result.row_count == 1)
    }

    async fn find_by_user(
        &self,
        exec: &dyn QueryExecutor,
        user_id: &UserId,
    ) -> Result<Option<Profile>, DomainError> {
        let sql = format!(
            "SELECT user_id, display_name, created_at FROM {}.profiles WHERE user_id = $1",
            self.schema
        );
        exec.query(&sql, &[(*user_id).into()]).await?.decode_first()
    }

    async fn delete(&self, exec: &dyn QueryExecutor, user_id: &UserId) -> Result<bool, DomainError> {
        let sql = format!("DELETE FROM {}.profiles WHERE user_id = $1", self.schema);
        let result = exec.query(&sql, &[(*user_id).into()]).await?;
        Ok(result.row_count > 0)
    }
}
