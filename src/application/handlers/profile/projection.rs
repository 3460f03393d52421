//! ProfileProjection - Keeps profiles in step with auth events.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::auth::{USER_DELETED, USER_REGISTERED};
use crate::domain::catalog::ModuleEvent;
use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::domain::profile::Profile;
use crate::ports::{EventHandler, ProfileRepository, QueryExecutor};

/// Event types the projection subscribes to.
pub const PROFILE_PROJECTION_EVENTS: [&str; 2] = [USER_REGISTERED, USER_DELETED];

/// Creates a profile per registered user and removes it on deletion.
///
/// Safe under redelivery: a second `auth.user_registered` for the same
/// user is ignored, as is deleting a profile that is already gone.
pub struct ProfileProjection {
    executor: Arc<dyn QueryExecutor>,
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileProjection {
    pub fn new(executor: Arc<dyn QueryExecutor>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { executor, profiles }
    }
}

#[async_trait]
impl EventHandler for ProfileProjection {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        match ModuleEvent::from_envelope(&event)? {
            ModuleEvent::UserRegistered(registered) => {
                let profile = Profile::new(registered.user_id, registered.display_name);
                if self.profiles.create_if_absent(self.executor.as_ref(), &profile).await? {
                    info!(user_id = %profile.user_id, "Profile created");
                } else {
                    debug!(user_id = %profile.user_id, "Profile already exists");
                }
            }
            ModuleEvent::UserDeleted(deleted) => {
                let removed = self.profiles.delete(self.executor.as_ref(), &deleted.user_id).await?;
                debug!(user_id = %deleted.user_id, removed, "Profile removal handled");
            }
            ModuleEvent::Unknown { event_type, .. } => {
                debug!(event_type = %event_type, "Ignoring event");
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ProfileProjection"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::{User, UserDeleted, UserRegistered};
    use crate::domain::foundation::{DomainEvent, ErrorCode, Timestamp, UserId};
    use crate::ports::{QueryResult, SqlParam};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct UnusedExecutor;

    #[async_trait]
    impl QueryExecutor for UnusedExecutor {
        async fn query(&self, _sql: &str, _params: &[SqlParam]) -> Result<QueryResult, DomainError> {
            Ok(QueryResult::default())
        }
    }

    #[derive(Default)]
    struct MockProfileRepository {
        profiles: Mutex<HashMap<UserId, Profile>>,
    }

    #[async_trait]
    impl ProfileRepository for MockProfileRepository {
        async fn create_if_absent(
            &self,
            _exec: &dyn QueryExecutor,
            profile: &Profile,
        ) -> Result<bool, DomainError> {
            let mut profiles = self.profiles.lock().unwrap();
            if profiles.contains_key(&profile.user_id) {
                return Ok(false);
            }
            profiles.insert(profile.user_id, profile.clone());
            Ok(true)
        }

        async fn find_by_user(
            &self,
            _exec: &dyn QueryExecutor,
            user_id: &UserId,
        ) -> Result<Option<Profile>, DomainError> {
            Ok(self.profiles.lock().unwrap().get(user_id).cloned())
        }

        async fn delete(&self, _exec: &dyn QueryExecutor, user_id: &UserId) -> Result<bool, DomainError> {
            Ok(self.profiles.lock().unwrap().remove(user_id).is_some())
        }
    }

    fn projection() -> (ProfileProjection, Arc<MockProfileRepository>) {
        let repo = Arc::new(MockProfileRepository::default());
        (ProfileProjection::new(Arc::new(UnusedExecutor), repo.clone()), repo)
    }

    fn registered(user: &User) -> EventEnvelope {
        UserRegistered::from(user).to_envelope().unwrap()
    }

    #[tokio::test]
    async fn registration_creates_profile() {
        let (projection, repo) = projection();
        let user = User::register("ada@example.com", "Ada").unwrap();

        projection.handle(registered(&user)).await.unwrap();

        let profiles = repo.profiles.lock().unwrap();
        assert_eq!(profiles[&user.id].display_name, "Ada");
    }

    #[tokio::test]
    async fn redelivered_registration_keeps_one_profile() {
        let (projection, repo) = projection();
        let user = User::register("ada@example.com", "Ada").unwrap();

        projection.handle(registered(&user)).await.unwrap();
        projection.handle(registered(&user)).await.unwrap();

        assert_eq!(repo.profiles.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deletion_removes_profile_and_tolerates_repeats() {
        let (projection, repo) = projection();
        let user = User::register("ada@example.com", "Ada").unwrap();
        projection.handle(registered(&user)).await.unwrap();

        let deleted = UserDeleted {
            user_id: user.id,
            deleted_at: Timestamp::now(),
        }
        .to_envelope()
        .unwrap();
        projection.handle(deleted.clone()).await.unwrap();
        projection.handle(deleted).await.unwrap();

        assert!(repo.profiles.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected() {
        let (projection, _) = projection();
        let event = EventEnvelope::new(USER_REGISTERED, json!({"user_id": "nope"}));

        let err = projection.handle(event).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidEventPayload);
    }

    #[tokio::test]
    async fn unknown_events_are_ignored() {
        let (projection, repo) = projection();

        projection
            .handle(EventEnvelope::new("billing.invoice_paid", json!({})))
            .await
            .unwrap();

        assert!(repo.profiles.lock().unwrap().is_empty());
    }
}
