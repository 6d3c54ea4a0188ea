//! PostgreSQL-based storage backend.
//!
//! Enumerations are stored as lowercase TEXT and address lists as TEXT[].
//! Partial updates use `COALESCE` so that only supplied fields change.
//!
//! Table structure:
//! - `users` - accounts and provider credentials
//! - `templates` - one partial unique index keeps a single default per owner
//! - `recipients` - one partial unique index per (owner, direction)
//! - `email_logs` - append-only send history

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::email::{EmailLog, EmailStatus};
use crate::recipient::{Recipient, RecipientType, UpdateRecipientRequest};
use crate::template::{Template, TemplateCategory, TemplatePatch};
use crate::user::{TokenUpdate, User};

use super::backend::{
    EmailLogStore, RecipientStore, StorageBackend, StorageError, StorageResult, TemplateStore,
    UserStore,
};
use super::pool::map_write_error;

const USER_COLUMNS: &str =
    "id, email, name, google_id, access_token, refresh_token, token_expiry, is_admin, created_at";
const TEMPLATE_COLUMNS: &str =
    "id, user_id, name, category, subject, body, variables, is_default, created_at";
const RECIPIENT_COLUMNS: &str =
    "id, user_id, name, email, recipient_type, is_default, created_at";
const EMAIL_LOG_COLUMNS: &str = "id, user_id, template_id, to_addresses, cc_addresses, subject, \
     body, status, message_id, error, sent_at";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    google_id: String,
    access_token: String,
    refresh_token: Option<String>,
    token_expiry: Option<DateTime<Utc>>,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            name: row.name,
            google_id: row.google_id,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            token_expiry: row.token_expiry,
            is_admin: row.is_admin,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct TemplateRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    category: String,
    subject: String,
    body: String,
    variables: Vec<String>,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<TemplateRow> for Template {
    type Error = StorageError;

    fn try_from(row: TemplateRow) -> Result<Self, Self::Error> {
        let category: TemplateCategory = row.category.parse().map_err(StorageError::Corrupt)?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            category,
            subject: row.subject,
            body: row.body,
            variables: row.variables,
            is_default: row.is_default,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct RecipientRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    email: String,
    recipient_type: String,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<RecipientRow> for Recipient {
    type Error = StorageError;

    fn try_from(row: RecipientRow) -> Result<Self, Self::Error> {
        let recipient_type: RecipientType =
            row.recipient_type.parse().map_err(StorageError::Corrupt)?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            recipient_type,
            is_default: row.is_default,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct EmailLogRow {
    id: Uuid,
    user_id: Uuid,
    template_id: Option<Uuid>,
    to_addresses: Vec<String>,
    cc_addresses: Vec<String>,
    subject: String,
    body: String,
    status: String,
    message_id: Option<String>,
    error: Option<String>,
    sent_at: DateTime<Utc>,
}

impl TryFrom<EmailLogRow> for EmailLog {
    type Error = StorageError;

    fn try_from(row: EmailLogRow) -> Result<Self, Self::Error> {
        let status: EmailStatus = row.status.parse().map_err(StorageError::Corrupt)?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            template_id: row.template_id,
            to: row.to_addresses,
            cc: row.cc_addresses,
            subject: row.subject,
            body: row.body,
            status,
            message_id: row.message_id,
            error: row.error,
            sent_at: row.sent_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StorageResult<Vec<T>>
where
    T: TryFrom<R, Error = StorageError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// PostgreSQL-based storage backend.
pub struct PostgresStorage {
    /// PostgreSQL connection pool
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PostgresStorage {
    async fn insert_user(&self, user: User) -> StorageResult<User> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, google_id, access_token, refresh_token,
                               token_expiry, is_admin, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.google_id)
        .bind(&user.access_token)
        .bind(&user.refresh_token)
        .bind(user.token_expiry)
        .bind(user.is_admin)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StorageResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_google_id(&self, google_id: &str) -> StorageResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE google_id = $1",
            USER_COLUMNS
        ))
        .bind(google_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn list_users(&self) -> StorageResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update_user_tokens(
        &self,
        id: Uuid,
        update: TokenUpdate,
    ) -> StorageResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users
            SET access_token = $2,
                refresh_token = COALESCE($3, refresh_token),
                token_expiry = $4,
                is_admin = COALESCE($5, is_admin)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(&update.access_token)
        .bind(&update.refresh_token)
        .bind(update.token_expiry)
        .bind(update.is_admin)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn delete_user(&self, id: Uuid) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TemplateStore for PostgresStorage {
    async fn insert_template(&self, template: Template) -> StorageResult<Template> {
        sqlx::query(
            r#"
            INSERT INTO templates (id, user_id, name, category, subject, body, variables,
                                   is_default, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(template.id)
        .bind(template.user_id)
        .bind(&template.name)
        .bind(template.category.as_str())
        .bind(&template.subject)
        .bind(&template.body)
        .bind(&template.variables)
        .bind(template.is_default)
        .bind(template.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(template)
    }

    async fn insert_templates(&self, templates: Vec<Template>) -> StorageResult<usize> {
        let mut tx = self.pool.begin().await?;
        let count = templates.len();

        for template in &templates {
            sqlx::query(
                r#"
                INSERT INTO templates (id, user_id, name, category, subject, body, variables,
                                       is_default, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(template.id)
            .bind(template.user_id)
            .bind(&template.name)
            .bind(template.category.as_str())
            .bind(&template.subject)
            .bind(&template.body)
            .bind(&template.variables)
            .bind(template.is_default)
            .bind(template.created_at)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        }

        tx.commit().await?;
        Ok(count)
    }

    async fn get_template(&self, id: Uuid) -> StorageResult<Option<Template>> {
        let row: Option<TemplateRow> = sqlx::query_as(&format!(
            "SELECT {} FROM templates WHERE id = $1",
            TEMPLATE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Template::try_from).transpose()
    }

    async fn list_templates(&self, owner: Option<Uuid>) -> StorageResult<Vec<Template>> {
        let rows: Vec<TemplateRow> = sqlx::query_as(&format!(
            "SELECT {} FROM templates WHERE ($1::uuid IS NULL OR user_id = $1) \
             ORDER BY created_at ASC",
            TEMPLATE_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn update_template(
        &self,
        id: Uuid,
        patch: TemplatePatch,
    ) -> StorageResult<Option<Template>> {
        let row: Option<TemplateRow> = sqlx::query_as(&format!(
            r#"
            UPDATE templates
            SET name = COALESCE($2, name),
                category = COALESCE($3, category),
                subject = COALESCE($4, subject),
                body = COALESCE($5, body),
                variables = COALESCE($6, variables),
                is_default = COALESCE($7, is_default)
            WHERE id = $1
            RETURNING {}
            "#,
            TEMPLATE_COLUMNS
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.subject)
        .bind(patch.body)
        .bind(patch.variables)
        .bind(patch.is_default)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;
        row.map(Template::try_from).transpose()
    }

    async fn delete_template(&self, id: Uuid, owner: Option<Uuid>) -> StorageResult<bool> {
        let result = sqlx::query(
            "DELETE FROM templates WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_templates_by_owner(&self, owner: Uuid) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM templates WHERE user_id = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn clear_default_templates(
        &self,
        owner: Uuid,
        except: Option<Uuid>,
    ) -> StorageResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE templates SET is_default = FALSE
            WHERE user_id = $1 AND is_default AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(owner)
        .bind(except)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn find_default_templates(&self, owner: Uuid) -> StorageResult<Vec<Template>> {
        let rows: Vec<TemplateRow> = sqlx::query_as(&format!(
            "SELECT {} FROM templates WHERE user_id = $1 AND is_default ORDER BY created_at ASC",
            TEMPLATE_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }
}

#[async_trait]
impl RecipientStore for PostgresStorage {
    async fn insert_recipient(&self, recipient: Recipient) -> StorageResult<Recipient> {
        sqlx::query(
            r#"
            INSERT INTO recipients (id, user_id, name, email, recipient_type, is_default, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(recipient.id)
        .bind(recipient.user_id)
        .bind(&recipient.name)
        .bind(&recipient.email)
        .bind(recipient.recipient_type.as_str())
        .bind(recipient.is_default)
        .bind(recipient.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(recipient)
    }

    async fn get_recipient(&self, id: Uuid) -> StorageResult<Option<Recipient>> {
        let row: Option<RecipientRow> = sqlx::query_as(&format!(
            "SELECT {} FROM recipients WHERE id = $1",
            RECIPIENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Recipient::try_from).transpose()
    }

    async fn list_recipients(&self, owner: Option<Uuid>) -> StorageResult<Vec<Recipient>> {
        let rows: Vec<RecipientRow> = sqlx::query_as(&format!(
            "SELECT {} FROM recipients WHERE ($1::uuid IS NULL OR user_id = $1) \
             ORDER BY created_at ASC",
            RECIPIENT_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn update_recipient(
        &self,
        id: Uuid,
        changes: UpdateRecipientRequest,
    ) -> StorageResult<Option<Recipient>> {
        let row: Option<RecipientRow> = sqlx::query_as(&format!(
            r#"
            UPDATE recipients
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                recipient_type = COALESCE($4, recipient_type),
                is_default = COALESCE($5, is_default)
            WHERE id = $1
            RETURNING {}
            "#,
            RECIPIENT_COLUMNS
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.recipient_type.map(|t| t.as_str()))
        .bind(changes.is_default)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;
        row.map(Recipient::try_from).transpose()
    }

    async fn delete_recipient(&self, id: Uuid, owner: Option<Uuid>) -> StorageResult<bool> {
        let result = sqlx::query(
            "DELETE FROM recipients WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_recipients_by_owner(&self, owner: Uuid) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM recipients WHERE user_id = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn clear_default_recipients(
        &self,
        owner: Uuid,
        direction: RecipientType,
        except: Option<Uuid>,
    ) -> StorageResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE recipients SET is_default = FALSE
            WHERE user_id = $1 AND recipient_type = $2 AND is_default
              AND ($3::uuid IS NULL OR id <> $3)
            "#,
        )
        .bind(owner)
        .bind(direction.as_str())
        .bind(except)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn find_default_recipients(
        &self,
        owner: Uuid,
        direction: Option<RecipientType>,
    ) -> StorageResult<Vec<Recipient>> {
        let rows: Vec<RecipientRow> = sqlx::query_as(&format!(
            "SELECT {} FROM recipients WHERE user_id = $1 AND is_default \
             AND ($2::text IS NULL OR recipient_type = $2) ORDER BY created_at ASC",
            RECIPIENT_COLUMNS
        ))
        .bind(owner)
        .bind(direction.map(|d| d.as_str()))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }
}

#[async_trait]
impl EmailLogStore for PostgresStorage {
    async fn insert_email_log(&self, log: EmailLog) -> StorageResult<EmailLog> {
        sqlx::query(
            r#"
            INSERT INTO email_logs (id, user_id, template_id, to_addresses, cc_addresses,
                                    subject, body, status, message_id, error, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(log.id)
        .bind(log.user_id)
        .bind(log.template_id)
        .bind(&log.to)
        .bind(&log.cc)
        .bind(&log.subject)
        .bind(&log.body)
        .bind(log.status.as_str())
        .bind(&log.message_id)
        .bind(&log.error)
        .bind(log.sent_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(log)
    }

    async fn list_email_logs(&self, owner: Uuid, limit: usize) -> StorageResult<Vec<EmailLog>> {
        let rows: Vec<EmailLogRow> = sqlx::query_as(&format!(
            "SELECT {} FROM email_logs WHERE user_id = $1 ORDER BY sent_at DESC LIMIT $2",
            EMAIL_LOG_COLUMNS
        ))
        .bind(owner)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn delete_email_logs_by_owner(&self, owner: Uuid) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM email_logs WHERE user_id = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl StorageBackend for PostgresStorage {
    fn backend_type(&self) -> &'static str {
        "postgres"
    }
}
