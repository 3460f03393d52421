//! UserRepository port - Persistence for the auth module's users.
//!
//! Every method takes the executor to run on, so a use-case can pass either
//! the pooled executor or the scope of an open transaction.

use async_trait::async_trait;

use crate::domain::auth::User;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::QueryExecutor;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user. A duplicate email fails with `EMAIL_TAKEN`.
    async fn insert(&self, exec: &dyn QueryExecutor, user: &User) -> Result<(), DomainError>;

    async fn find_by_id(
        &self,
        exec: &dyn QueryExecutor,
        id: &UserId,
    ) -> Result<Option<User>, DomainError>;

    async fn find_by_email(
        &self,
        exec: &dyn QueryExecutor,
        email: &str,
    ) -> Result<Option<User>, DomainError>;

    /// Deletes a user, returning whether a row was removed.
    async fn delete(&self, exec: &dyn QueryExecutor, id: &UserId) -> Result<bool, DomainError>;
}
