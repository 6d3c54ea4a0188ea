//! In-memory storage backend using DashMap.
//!
//! Records live in one map per collection keyed by record id and are lost on
//! restart. Intended for development and tests.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::email::EmailLog;
use crate::recipient::{Recipient, RecipientType, UpdateRecipientRequest};
use crate::template::{Template, TemplatePatch};
use crate::user::{TokenUpdate, User};

use super::backend::{
    EmailLogStore, RecipientStore, StorageBackend, StorageError, StorageResult, TemplateStore,
    UserStore,
};

/// In-memory storage backend.
#[derive(Default)]
pub struct MemoryStorage {
    users: DashMap<Uuid, User>,
    templates: DashMap<Uuid, Template>,
    recipients: DashMap<Uuid, Recipient>,
    email_logs: DashMap<Uuid, EmailLog>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Clone every value matching `filter`, oldest first
fn collect_sorted<T, F, K>(map: &DashMap<Uuid, T>, filter: F, key: K) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> bool,
    K: Fn(&T) -> chrono::DateTime<chrono::Utc>,
{
    let mut items: Vec<T> = map
        .iter()
        .filter(|entry| filter(entry.value()))
        .map(|entry| entry.value().clone())
        .collect();
    items.sort_by_key(|item| key(item));
    items
}

fn owned_by(owner: Option<Uuid>, user_id: Uuid) -> bool {
    owner.map_or(true, |owner| owner == user_id)
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn insert_user(&self, user: User) -> StorageResult<User> {
        let duplicate = self
            .users
            .iter()
            .any(|entry| entry.google_id == user.google_id);
        if duplicate {
            return Err(StorageError::Conflict(format!(
                "user with provider id {} already exists",
                user.google_id
            )));
        }
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StorageResult<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_user_by_google_id(&self, google_id: &str) -> StorageResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.google_id == google_id)
            .map(|entry| entry.value().clone()))
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        Ok(collect_sorted(&self.users, |_| true, |u| u.created_at))
    }

    async fn update_user_tokens(
        &self,
        id: Uuid,
        update: TokenUpdate,
    ) -> StorageResult<Option<User>> {
        Ok(self.users.get_mut(&id).map(|mut entry| {
            update.apply(entry.value_mut());
            entry.value().clone()
        }))
    }

    async fn delete_user(&self, id: Uuid) -> StorageResult<bool> {
        Ok(self.users.remove(&id).is_some())
    }
}

#[async_trait]
impl TemplateStore for MemoryStorage {
    async fn insert_template(&self, template: Template) -> StorageResult<Template> {
        self.templates.insert(template.id, template.clone());
        Ok(template)
    }

    async fn insert_templates(&self, templates: Vec<Template>) -> StorageResult<usize> {
        let count = templates.len();
        for template in templates {
            self.templates.insert(template.id, template);
        }
        Ok(count)
    }

    async fn get_template(&self, id: Uuid) -> StorageResult<Option<Template>> {
        Ok(self.templates.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_templates(&self, owner: Option<Uuid>) -> StorageResult<Vec<Template>> {
        Ok(collect_sorted(
            &self.templates,
            |t| owned_by(owner, t.user_id),
            |t| t.created_at,
        ))
    }

    async fn update_template(
        &self,
        id: Uuid,
        patch: TemplatePatch,
    ) -> StorageResult<Option<Template>> {
        Ok(self.templates.get_mut(&id).map(|mut entry| {
            patch.apply(entry.value_mut());
            entry.value().clone()
        }))
    }

    async fn delete_template(&self, id: Uuid, owner: Option<Uuid>) -> StorageResult<bool> {
        Ok(self
            .templates
            .remove_if(&id, |_, t| owned_by(owner, t.user_id))
            .is_some())
    }

    async fn delete_templates_by_owner(&self, owner: Uuid) -> StorageResult<u64> {
        let before = self.templates.len();
        self.templates.retain(|_, t| t.user_id != owner);
        Ok((before - self.templates.len()) as u64)
    }

    async fn clear_default_templates(
        &self,
        owner: Uuid,
        except: Option<Uuid>,
    ) -> StorageResult<u64> {
        let mut cleared = 0;
        for mut entry in self.templates.iter_mut() {
            let template = entry.value_mut();
            if template.user_id == owner && template.is_default && Some(template.id) != except {
                template.is_default = false;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn find_default_templates(&self, owner: Uuid) -> StorageResult<Vec<Template>> {
        Ok(collect_sorted(
            &self.templates,
            |t| t.user_id == owner && t.is_default,
            |t| t.created_at,
        ))
    }
}

#[async_trait]
impl RecipientStore for MemoryStorage {
    async fn insert_recipient(&self, recipient: Recipient) -> StorageResult<Recipient> {
        self.recipients.insert(recipient.id, recipient.clone());
        Ok(recipient)
    }

    async fn get_recipient(&self, id: Uuid) -> StorageResult<Option<Recipient>> {
        Ok(self.recipients.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_recipients(&self, owner: Option<Uuid>) -> StorageResult<Vec<Recipient>> {
        Ok(collect_sorted(
            &self.recipients,
            |r| owned_by(owner, r.user_id),
            |r| r.created_at,
        ))
    }

    async fn update_recipient(
        &self,
        id: Uuid,
        changes: UpdateRecipientRequest,
    ) -> StorageResult<Option<Recipient>> {
        Ok(self.recipients.get_mut(&id).map(|mut entry| {
            changes.apply(entry.value_mut());
            entry.value().clone()
        }))
    }

    async fn delete_recipient(&self, id: Uuid, owner: Option<Uuid>) -> StorageResult<bool> {
        Ok(self
            .recipients
            .remove_if(&id, |_, r| owned_by(owner, r.user_id))
            .is_some())
    }

    async fn delete_recipients_by_owner(&self, owner: Uuid) -> StorageResult<u64> {
        let before = self.recipients.len();
        self.recipients.retain(|_, r| r.user_id != owner);
        Ok((before - self.recipients.len()) as u64)
    }

    async fn clear_default_recipients(
        &self,
        owner: Uuid,
        direction: RecipientType,
        except: Option<Uuid>,
    ) -> StorageResult<u64> {
        let mut cleared = 0;
        for mut entry in self.recipients.iter_mut() {
            let recipient = entry.value_mut();
            if recipient.user_id == owner
                && recipient.recipient_type == direction
                && recipient.is_default
                && Some(recipient.id) != except
            {
                recipient.is_default = false;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn find_default_recipients(
        &self,
        owner: Uuid,
        direction: Option<RecipientType>,
    ) -> StorageResult<Vec<Recipient>> {
        Ok(collect_sorted(
            &self.recipients,
            |r| {
                r.user_id == owner
                    && r.is_default
                    && direction.map_or(true, |d| d == r.recipient_type)
            },
            |r| r.created_at,
        ))
    }
}

#[async_trait]
impl EmailLogStore for MemoryStorage {
    async fn insert_email_log(&self, log: EmailLog) -> StorageResult<EmailLog> {
        self.email_logs.insert(log.id, log.clone());
        Ok(log)
    }

    async fn list_email_logs(&self, owner: Uuid, limit: usize) -> StorageResult<Vec<EmailLog>> {
        let mut logs = collect_sorted(&self.email_logs, |l| l.user_id == owner, |l| l.sent_at);
        logs.reverse();
        logs.truncate(limit);
        Ok(logs)
    }

    async fn delete_email_logs_by_owner(&self, owner: Uuid) -> StorageResult<u64> {
        let before = self.email_logs.len();
        self.email_logs.retain(|_, l| l.user_id != owner);
        Ok((before - self.email_logs.len()) as u64)
    }
}

impl StorageBackend for MemoryStorage {
    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
