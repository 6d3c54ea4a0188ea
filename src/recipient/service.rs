//! Recipient CRUD with per-direction default selection

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::defaults::{current_default_recipients, set_as_default, DefaultScope};
use crate::error::{AppError, Result};
use crate::storage::StorageBackend;
use crate::user::AccessScope;

use super::types::{
    CreateRecipientRequest, DefaultRecipientsResponse, Recipient, RecipientSummary,
    RecipientType, UpdateRecipientRequest,
};

#[derive(Clone)]
pub struct RecipientService {
    store: Arc<dyn StorageBackend>,
}

impl RecipientService {
    pub fn new(store: Arc<dyn StorageBackend>) -> Self {
        Self { store }
    }

    pub async fn list(&self, scope: AccessScope) -> Result<Vec<Recipient>> {
        Ok(self.store.list_recipients(scope.owner()).await?)
    }

    pub async fn get(&self, scope: AccessScope, id: Uuid) -> Result<Recipient> {
        match self.store.get_recipient(id).await? {
            Some(recipient) if scope.permits(recipient.user_id) => Ok(recipient),
            _ => Err(AppError::NotFound("Recipient not found".to_string())),
        }
    }

    pub async fn create(&self, owner: Uuid, req: CreateRecipientRequest) -> Result<Recipient> {
        req.validate()?;
        self.insert_for(owner, &req).await
    }

    /// Merge the supplied fields into a recipient.
    ///
    /// A recipient that ends up default, whether the request sets the flag
    /// or an existing default keeps it, clears the other defaults of its
    /// resulting direction. A direction change moves the default into the
    /// new direction.
    pub async fn update(
        &self,
        scope: AccessScope,
        id: Uuid,
        req: UpdateRecipientRequest,
    ) -> Result<Recipient> {
        req.validate()?;
        let existing = self.get(scope, id).await?;

        let will_be_default = req.is_default.unwrap_or(existing.is_default);
        if will_be_default {
            let direction = req.recipient_type.unwrap_or(existing.recipient_type);
            set_as_default(
                self.store.as_ref(),
                DefaultScope::Recipients {
                    owner: existing.user_id,
                    direction,
                },
                Some(id),
            )
            .await?;
        }

        self.store
            .update_recipient(id, req)
            .await?
            .ok_or_else(|| AppError::NotFound("Recipient not found".to_string()))
    }

    pub async fn delete(&self, scope: AccessScope, id: Uuid) -> Result<()> {
        if self.store.delete_recipient(id, scope.owner()).await? {
            tracing::info!(recipient_id = %id, "Recipient deleted");
            Ok(())
        } else {
            Err(AppError::NotFound("Recipient not found".to_string()))
        }
    }

    /// The owner's default `to` and `cc` recipients
    pub async fn defaults(&self, owner: Uuid) -> Result<DefaultRecipientsResponse> {
        let to = current_default_recipients(self.store.as_ref(), owner, RecipientType::To).await?;
        let cc = current_default_recipients(self.store.as_ref(), owner, RecipientType::Cc).await?;

        Ok(DefaultRecipientsResponse {
            to: to.iter().map(RecipientSummary::from).collect(),
            cc: cc.iter().map(RecipientSummary::from).collect(),
        })
    }

    /// Copy one recipient to every user.
    ///
    /// A default flag is honoured per user through the enforcer. Returns the
    /// number of users that received a copy.
    pub async fn bulk_create(&self, req: CreateRecipientRequest) -> Result<usize> {
        req.validate()?;

        let users = self.store.list_users().await?;
        for user in &users {
            self.insert_for(user.id, &req).await?;
        }

        tracing::info!(count = users.len(), "Recipient bulk-created for all users");
        Ok(users.len())
    }

    async fn insert_for(&self, owner: Uuid, req: &CreateRecipientRequest) -> Result<Recipient> {
        if req.is_default {
            set_as_default(
                self.store.as_ref(),
                DefaultScope::Recipients {
                    owner,
                    direction: req.recipient_type,
                },
                None,
            )
            .await?;
        }

        let recipient = Recipient {
            id: Uuid::new_v4(),
            user_id: owner,
            name: req.name.clone(),
            email: req.email.clone(),
            recipient_type: req.recipient_type,
            is_default: req.is_default,
            created_at: Utc::now(),
        };

        let recipient = self.store.insert_recipient(recipient).await?;
        tracing::debug!(
            user_id = %owner,
            recipient_id = %recipient.id,
            recipient_type = %recipient.recipient_type,
            "Recipient created"
        );
        Ok(recipient)
    }
}
