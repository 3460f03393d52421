//! DeleteUser - Command handler for removing user accounts.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapters::postgres::TransactionCoordinator;
use crate::domain::auth::UserDeleted;
use crate::domain::foundation::{DomainError, DomainEvent, ErrorCode, Timestamp, UserId};
use crate::ports::{EventPublisher, UserRepository};

/// Command to delete a user.
#[derive(Debug, Clone)]
pub struct DeleteUserCommand {
    pub user_id: UserId,
}

/// Result of a committed deletion.
#[derive(Debug, Clone)]
pub struct DeleteUserResult {
    pub handler_errors: Option<DomainError>,
}

/// Handler for deleting users.
pub struct DeleteUserHandler {
    transactions: TransactionCoordinator,
    users: Arc<dyn UserRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl DeleteUserHandler {
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

    pub async fn handle(&self, cmd: DeleteUserCommand) -> Result<DeleteUserResult, DomainError> {
        let users = Arc::clone(&self.users);
        let user_id = cmd.user_id;
        self.transactions
            .run(move |tx| async move {
                if !users.delete(&tx, &user_id).await? {
                    return Err(DomainError::new(
                        ErrorCode::UserNotFound,
                        format!("User {} not found", user_id),
                    ));
                }
                Ok(())
            })
            .await?;

        info!(user_id = %user_id, "User deleted");

        let event = UserDeleted {
            user_id,
            deleted_at: Timestamp::now(),
        };
        let handler_errors = match self.publisher.publish(event.to_envelope()?).await {
            Ok(()) => None,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Subscribers failed after deletion");
                Some(e)
            }
        };

        Ok(DeleteUserResult { handler_errors })
    }
}
