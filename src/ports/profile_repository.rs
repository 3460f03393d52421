//! ProfileRepository port - Persistence for the profiles module.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::profile::Profile;
use crate::ports::QueryExecutor;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Inserts the profile unless one already exists for the user.
    ///
    /// Returns `true` if a row was inserted. Repeating the call is harmless,
    /// which is what makes the profile projection idempotent.
    async fn create_if_absent(
        &self,
        exec: &dyn QueryExecutor,
        profile: &Profile,
    ) -> Result<bool, DomainError>;

    async fn find_by_user(
        &self,
        exec: &dyn QueryExecutor,
        user_id: &UserId,
    ) -> Result<Option<Profile>, DomainError>;

    /// Deletes the user's profile, returning whether a row was removed.
    async fn delete(&self, exec: &dyn QueryExecutor, user_id: &UserId) -> Result<bool, DomainError>;
}
