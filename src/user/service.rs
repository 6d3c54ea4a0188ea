//! Account administration

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::storage::StorageBackend;

use super::types::{User, UserResponse};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn StorageBackend>,
}

impl UserService {
    pub fn new(store: Arc<dyn StorageBackend>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<UserResponse>> {
        let users = self.store.list_users().await?;
        Ok(users.iter().map(UserResponse::from).collect())
    }

    /// Fail with `NotFound` unless the user exists
    pub async fn ensure_exists(&self, id: Uuid) -> Result<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Delete a user together with every template, recipient and history
    /// entry they own. An admin cannot delete their own account.
    pub async fn delete_with_cascade(&self, actor: &User, target: Uuid) -> Result<()> {
        if actor.id == target {
            return Err(AppError::Conflict("Cannot delete yourself".to_string()));
        }
        self.ensure_exists(target).await?;

        let templates = self.store.delete_templates_by_owner(target).await?;
        let recipients = self.store.delete_recipients_by_owner(target).await?;
        let logs = self.store.delete_email_logs_by_owner(target).await?;

        if !self.store.delete_user(target).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tracing::info!(
            admin_id = %actor.id,
            user_id = %target,
            templates = templates,
            recipients = recipients,
            email_logs = logs,
            "User and owned records deleted"
        );
        Ok(())
    }
}
