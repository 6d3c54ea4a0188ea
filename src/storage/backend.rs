//! Backend traits for record storage.
//!
//! This module defines the abstraction layer over the document store,
//! allowing different storage implementations (memory, PostgreSQL) to be
//! used interchangeably. Updates merge the supplied fields into the stored
//! record rather than replacing it.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::email::EmailLog;
use crate::recipient::{Recipient, RecipientType, UpdateRecipientRequest};
use crate::template::{Template, TemplatePatch};
use crate::user::{TokenUpdate, User};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// PostgreSQL operation failed
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A uniqueness constraint rejected the write
    #[error("Conflicting write: {0}")]
    Conflict(String),

    /// A stored value could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Backend is temporarily unavailable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// User accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: User) -> StorageResult<User>;

    async fn get_user(&self, id: Uuid) -> StorageResult<Option<User>>;

    async fn find_user_by_google_id(&self, google_id: &str) -> StorageResult<Option<User>>;

    async fn list_users(&self) -> StorageResult<Vec<User>>;

    /// Merge new credentials (and optionally the admin flag) into a user.
    ///
    /// Returns `None` if the user does not exist.
    async fn update_user_tokens(&self, id: Uuid, update: TokenUpdate)
        -> StorageResult<Option<User>>;

    /// Delete the user record only. Owned records are removed by the caller.
    async fn delete_user(&self, id: Uuid) -> StorageResult<bool>;
}

/// Email templates.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn insert_template(&self, template: Template) -> StorageResult<Template>;

    async fn insert_templates(&self, templates: Vec<Template>) -> StorageResult<usize>;

    async fn get_template(&self, id: Uuid) -> StorageResult<Option<Template>>;

    /// List templates of one owner, or of every owner when `owner` is `None`.
    /// Results are ordered by creation time.
    async fn list_templates(&self, owner: Option<Uuid>) -> StorageResult<Vec<Template>>;

    async fn update_template(&self, id: Uuid, patch: TemplatePatch)
        -> StorageResult<Option<Template>>;

    /// Delete a template, restricted to `owner` when given.
    async fn delete_template(&self, id: Uuid, owner: Option<Uuid>) -> StorageResult<bool>;

    async fn delete_templates_by_owner(&self, owner: Uuid) -> StorageResult<u64>;

    /// Clear `is_default` on the owner's templates except `except`.
    ///
    /// Returns the number of templates that were default before the call.
    async fn clear_default_templates(&self, owner: Uuid, except: Option<Uuid>)
        -> StorageResult<u64>;

    async fn find_default_templates(&self, owner: Uuid) -> StorageResult<Vec<Template>>;
}

/// Saved recipients.
#[async_trait]
pub trait RecipientStore: Send + Sync {
    async fn insert_recipient(&self, recipient: Recipient) -> StorageResult<Recipient>;

    async fn get_recipient(&self, id: Uuid) -> StorageResult<Option<Recipient>>;

    /// List recipients of one owner, or of every owner when `owner` is `None`.
    async fn list_recipients(&self, owner: Option<Uuid>) -> StorageResult<Vec<Recipient>>;

    async fn update_recipient(
        &self,
        id: Uuid,
        changes: UpdateRecipientRequest,
    ) -> StorageResult<Option<Recipient>>;

    async fn delete_recipient(&self, id: Uuid, owner: Option<Uuid>) -> StorageResult<bool>;

    async fn delete_recipients_by_owner(&self, owner: Uuid) -> StorageResult<u64>;

    /// Clear `is_default` on the owner's recipients of `direction` except `except`.
    async fn clear_default_recipients(
        &self,
        owner: Uuid,
        direction: RecipientType,
        except: Option<Uuid>,
    ) -> StorageResult<u64>;

    /// Default recipients of the owner, optionally limited to one direction.
    async fn find_default_recipients(
        &self,
        owner: Uuid,
        direction: Option<RecipientType>,
    ) -> StorageResult<Vec<Recipient>>;
}

/// Append-only send history.
#[async_trait]
pub trait EmailLogStore: Send + Sync {
    async fn insert_email_log(&self, log: EmailLog) -> StorageResult<EmailLog>;

    /// Most recent logs of the owner first.
    async fn list_email_logs(&self, owner: Uuid, limit: usize) -> StorageResult<Vec<EmailLog>>;

    async fn delete_email_logs_by_owner(&self, owner: Uuid) -> StorageResult<u64>;
}

/// Every collection the service persists.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`) as they are shared
/// across request handlers.
pub trait StorageBackend: UserStore + TemplateStore + RecipientStore + EmailLogStore {
    /// Backend type identifier
    fn backend_type(&self) -> &'static str;
}
