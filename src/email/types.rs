//! Send requests, outgoing messages and the send history record

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::recipient::validate_emails;

/// Outcome recorded for one send attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Sent,
    Failed,
    Pending,
}

impl EmailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailStatus::Sent => "sent",
            EmailStatus::Failed => "failed",
            EmailStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sent" => Ok(EmailStatus::Sent),
            "failed" => Ok(EmailStatus::Failed),
            "pending" => Ok(EmailStatus::Pending),
            other => Err(format!("unknown email status: {}", other)),
        }
    }
}

/// Append-only record of a single send attempt.
///
/// Never mutated once written. Removed only when the owning user is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub template_id: Option<Uuid>,
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub status: EmailStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl EmailLog {
    fn attempt(user_id: Uuid, email: &OutgoingEmail, template_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            template_id,
            to: email.to.clone(),
            cc: email.cc.clone(),
            subject: email.subject.clone(),
            body: email.body.clone(),
            status: EmailStatus::Pending,
            message_id: None,
            error: None,
            sent_at: Utc::now(),
        }
    }

    pub fn sent(
        user_id: Uuid,
        email: &OutgoingEmail,
        template_id: Option<Uuid>,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            status: EmailStatus::Sent,
            message_id: Some(message_id.into()),
            ..Self::attempt(user_id, email, template_id)
        }
    }

    pub fn failed(
        user_id: Uuid,
        email: &OutgoingEmail,
        template_id: Option<Uuid>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            status: EmailStatus::Failed,
            error: Some(error.into()),
            ..Self::attempt(user_id, email, template_id)
        }
    }
}

/// History entry as listed to its owner (body omitted)
#[derive(Debug, Clone, Serialize)]
pub struct EmailLogResponse {
    pub id: Uuid,
    pub template_id: Option<Uuid>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub status: EmailStatus,
    pub sent_at: DateTime<Utc>,
}

impl From<EmailLog> for EmailLogResponse {
    fn from(log: EmailLog) -> Self {
        Self {
            id: log.id,
            template_id: log.template_id,
            to: log.to,
            cc: log.cc,
            subject: log.subject,
            status: log.status,
            sent_at: log.sent_at,
        }
    }
}

/// A fully resolved message ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Result of handing a message to the transport
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Sent { message_id: String },
    Failed { error: String },
}

/// `POST /api/email/send`
#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailRequest {
    pub template_id: Option<Uuid>,
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

impl SendEmailRequest {
    pub fn validate(&self) -> Result<()> {
        validate_emails(&self.to)?;
        validate_emails(&self.cc)
    }
}

/// `POST /api/email/send-template`
///
/// An absent `to` or `cc` list falls back to the caller's default recipients
/// of that direction. An explicitly empty list does not.
#[derive(Debug, Clone, Deserialize)]
pub struct SendTemplateRequest {
    pub template_id: Uuid,
    pub to: Option<Vec<String>>,
    pub cc: Option<Vec<String>>,
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

impl SendTemplateRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(to) = &self.to {
            validate_emails(to)?;
        }
        if let Some(cc) = &self.cc {
            validate_emails(cc)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SendEmailResponse {
    pub success: bool,
    pub message_id: String,
    pub log_id: Uuid,
    pub message: String,
}
