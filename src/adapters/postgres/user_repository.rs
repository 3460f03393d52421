//! PostgreSQL implementation of UserRepository.

use async_trait::async_trait;

use super::errors::is_unique_violation;
use crate::domain::auth::User;
use crate::domain::foundation::{validate_identifier, DomainError, ErrorCode, UserId};
use crate::ports::{QueryExecutor, UserRepository};

/// Users stored in `<schema>.users`.
pub struct PostgresUserRepository {
    schema: String,
}

impl PostgresUserRepository {
    pub fn new(schema: impl Into<String>) -> Result<Self, DomainError> {
        let schema = schema.into();
        validate_identifier("schema", &schema)?;
        Ok(Self { schema })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, exec: &dyn QueryExecutor, user: &User) -> Result<(), DomainError> {
        let sql = format!(
            r#"
            INSERT INTO {}.users (id, email, display_name, registered_at)
            VALUES ($1, $2, $3, $4)
            "#,
            self.schema
        );

        exec.query(
            &sql,
            &[
                user.id.into(),
                user.email.as_str().into(),
                user.display_name.as_str().into(),
                user.registered_at.into(),
            ],
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) && e.detail("constraint") == Some("users_email_key") {
                DomainError::new(
                    ErrorCode::EmailTaken,
                    format!("Email {} is already registered", user.email),
                )
            } else {
                e
            }
        })?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        exec: &dyn QueryExecutor,
        id: &UserId,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT id, email, display_name, registered_at FROM {}.users WHERE id = $1",
            self.schema
        );
        exec.query(&sql, &[(*id).into()]).await?.decode_first()
    }

    async fn find_by_email(
        &self,
        exec: &dyn QueryExecutor,
        email: &str,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT id, email, display_name, registered_at FROM {}.users WHERE email = $1",
            self.schema
        );
        exec.query(&sql, &[email.into()]).await?.decode_first()
    }

    async fn delete(&self, exec: &dyn QueryExecutor, id: &UserId) -> Result<bool, DomainError> {
        let sql = format!("DELETE FROM {}.users WHERE id = $1", self.schema);
        let result = exec.query(&sql, &[(*id).into()]).await?;
        Ok(result.row_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_schema() {
        assert!(PostgresUserRepository::new("auth-users").is_err());
        assert!(PostgresUserRepository::new("auth").is_ok());
    }
}
