//! RegisterUser - Command handler for creating user accounts.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapters::postgres::TransactionCoordinator;
use crate::domain::auth::{User, UserRegistered};
use crate::domain::foundation::{DomainError, DomainEvent, ErrorCode};
use crate::ports::{EventPublisher, UserRepository};

/// Command to register a new user.
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub email: String,
    pub display_name: String,
}

/// Result of a committed registration.
#[derive(Debug, Clone)]
pub struct RegisterUserResult {
    pub user: User,
    /// Failures reported by `auth.user_registered` subscribers. The
    /// registration itself stays committed.
    pub handler_errors: Option<DomainError>,
}

/// Handler for registering users.
pub struct RegisterUserHandler {
    transactions: TransactionCoordinator,
    users: Arc<dyn UserRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl RegisterUserHandler {
    pub fn new(
        transactions: TransactionCoordinator,
        users: Arc<dyn UserRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            transactions,
            users,
            publisher,
        }
    }

    pub async fn handle(&self, cmd: RegisterUserCommand) -> Result<RegisterUserResult, DomainError> {
        // 1. Validate input
        let user = User::register(cmd.email, cmd.display_name)?;

        // 2. Uniqueness check and insert in one transaction
        let users = Arc::clone(&self.users);
        let user = self
            .transactions
            .run(move |tx| async move {
                if users.find_by_email(&tx, &user.email).await?.is_some() {
                    return Err(DomainError::new(
                        ErrorCode::EmailTaken,
                        format!("Email {} is already registered", user.email),
                    ));
                }
                users.insert(&tx, &user).await?;
                Ok(user)
            })
            .await?;

        info!(user_id = %user.id, "User registered");

        // 3. Publish only after commit
        let envelope = UserRegistered::from(&user).to_envelope()?;
        let handler_errors = match self.publisher.publish(envelope).await {
            Ok(()) => None,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Subscribers failed after registration");
                Some(e)
            }
        };

        Ok(RegisterUserResult {
            user,
            handler_errors,
        })
    }
}
