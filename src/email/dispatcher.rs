//! Send orchestration.
//!
//! Every message that reaches the transport produces exactly one history
//! entry: `sent` with the provider's message id, or `failed` with the error
//! text. Nothing is retried. A send with no `to` address is rejected before
//! the transport and leaves no history.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::auth::CredentialProvider;
use crate::defaults::current_default_recipients;
use crate::error::{AppError, Result};
use crate::metrics::EmailMetrics;
use crate::recipient::{RecipientSummary, RecipientType};
use crate::storage::StorageBackend;
use crate::template::{resolve, ResolveContext, Template, TemplatePreview};
use crate::user::User;

use super::transport::{MailTransport, TransportError};
use super::types::{
    EmailLog, EmailLogResponse, OutgoingEmail, SendEmailRequest, SendEmailResponse, SendOutcome,
    SendTemplateRequest,
};

/// Maximum number of history entries returned to a user
pub const LOG_LIST_LIMIT: usize = 100;

#[derive(Clone)]
pub struct EmailDispatcher {
    store: Arc<dyn StorageBackend>,
    transport: Arc<dyn MailTransport>,
    credentials: CredentialProvider,
}

impl EmailDispatcher {
    pub fn new(
        store: Arc<dyn StorageBackend>,
        transport: Arc<dyn MailTransport>,
        credentials: CredentialProvider,
    ) -> Self {
        Self {
            store,
            transport,
            credentials,
        }
    }

    /// Hand a resolved message to the transport and record the attempt.
    ///
    /// Returns `NoRecipients` without touching the transport when `to` is
    /// empty, and `Transport` after logging a failed attempt.
    pub async fn send(
        &self,
        user: &User,
        to: Vec<String>,
        cc: Vec<String>,
        subject: String,
        body: String,
        template_id: Option<Uuid>,
    ) -> Result<SendEmailResponse> {
        if to.is_empty() {
            EmailMetrics::record_rejected("no_recipients");
            return Err(AppError::NoRecipients);
        }

        let email = OutgoingEmail {
            from: user.email.clone(),
            to,
            cc,
            subject,
            body,
        };

        let outcome = self.deliver(user, &email).await;
        let log = match &outcome {
            SendOutcome::Sent { message_id } => {
                EmailLog::sent(user.id, &email, template_id, message_id.as_str())
            }
            SendOutcome::Failed { error } => {
                EmailLog::failed(user.id, &email, template_id, error.as_str())
            }
        };
        let log_id = log.id;

        if let Err(e) = self.store.insert_email_log(log).await {
            tracing::error!(
                user_id = %user.id,
                log_id = %log_id,
                error = %e,
                "Failed to record send attempt"
            );
        }

        match outcome {
            SendOutcome::Sent { message_id } => Ok(SendEmailResponse {
                success: true,
                message_id,
                log_id,
                message: "Email sent successfully".to_string(),
            }),
            SendOutcome::Failed { error } => Err(AppError::Transport(error)),
        }
    }

    /// Obtain a credential and call the transport once
    async fn deliver(&self, user: &User, email: &OutgoingEmail) -> SendOutcome {
        let access_token = match self.credentials.access_token(user).await {
            Ok(token) => token,
            Err(e) => {
                let error = TransportError::Credentials(e.to_string()).to_string();
                tracing::warn!(user_id = %user.id, error = %error, "Credential refresh failed");
                EmailMetrics::record_failed(None);
                return SendOutcome::Failed { error };
            }
        };

        let started = Instant::now();
        match self.transport.send(&access_token, email).await {
            Ok(message_id) => {
                EmailMetrics::record_sent(started.elapsed());
                tracing::info!(
                    user_id = %user.id,
                    message_id = %message_id,
                    to_count = email.to.len(),
                    cc_count = email.cc.len(),
                    "Email sent"
                );
                SendOutcome::Sent { message_id }
            }
            Err(e) => {
                EmailMetrics::record_failed(Some(started.elapsed()));
                tracing::warn!(user_id = %user.id, error = %e, "Email send failed");
                SendOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Send caller-authored text after resolving placeholders
    pub async fn send_custom(&self, user: &User, req: SendEmailRequest) -> Result<SendEmailResponse> {
        req.validate()?;
        let (subject, body) = resolve_pair(user, &req.subject, &req.body, &req.variables);
        self.send(user, req.to, req.cc, subject, body, req.template_id)
            .await
    }

    /// Send one of the caller's templates.
    ///
    /// An absent `to` or `cc` list is filled from the caller's defaults.
    pub async fn send_template(
        &self,
        user: &User,
        req: SendTemplateRequest,
    ) -> Result<SendEmailResponse> {
        req.validate()?;
        let template = self.owned_template(user, req.template_id).await?;

        let to = match req.to {
            Some(to) => to,
            None => self.default_addresses(user.id, RecipientType::To).await?,
        };
        let cc = match req.cc {
            Some(cc) => cc,
            None => self.default_addresses(user.id, RecipientType::Cc).await?,
        };

        let (subject, body) =
            resolve_pair(user, &template.subject, &template.body, &req.variables);
        self.send(user, to, cc, subject, body, Some(template.id))
            .await
    }

    /// Resolve a template with auto-filled values only
    pub async fn preview(&self, user: &User, template_id: Uuid) -> Result<TemplatePreview> {
        let template = self.owned_template(user, template_id).await?;
        let (subject, body) =
            resolve_pair(user, &template.subject, &template.body, &HashMap::new());

        let default_to =
            current_default_recipients(self.store.as_ref(), user.id, RecipientType::To).await?;
        let default_cc =
            current_default_recipients(self.store.as_ref(), user.id, RecipientType::Cc).await?;

        Ok(TemplatePreview {
            template_name: template.name,
            subject,
            body,
            variables: template.variables,
            default_to: default_to.iter().map(RecipientSummary::from).collect(),
            default_cc: default_cc.iter().map(RecipientSummary::from).collect(),
        })
    }

    /// The caller's most recent send attempts, newest first
    pub async fn logs(&self, user: &User) -> Result<Vec<EmailLogResponse>> {
        let logs = self.store.list_email_logs(user.id, LOG_LIST_LIMIT).await?;
        Ok(logs.into_iter().map(EmailLogResponse::from).collect())
    }

    async fn owned_template(&self, user: &User, id: Uuid) -> Result<Template> {
        match self.store.get_template(id).await? {
            Some(template) if template.user_id == user.id => Ok(template),
            _ => Err(AppError::NotFound("Template not found".to_string())),
        }
    }

    async fn default_addresses(&self, owner: Uuid, direction: RecipientType) -> Result<Vec<String>> {
        Ok(
            current_default_recipients(self.store.as_ref(), owner, direction)
                .await?
                .into_iter()
                .map(|r| r.email)
                .collect(),
        )
    }
}

fn resolve_pair(
    user: &User,
    subject: &str,
    body: &str,
    overrides: &HashMap<String, String>,
) -> (String, String) {
    let ctx = ResolveContext::new(&user.name, &user.email);
    (
        resolve(subject, overrides, &ctx),
        resolve(body, overrides, &ctx),
    )
}
