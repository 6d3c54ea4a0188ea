//! Recipient types and address validation

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r#"^[^@\s]+@[^@\s]+\.[^.@\s]+$"#).unwrap();
}

/// Whether `email` looks like a deliverable address
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Reject the first malformed address in `emails`
pub fn validate_emails<'a, I>(emails: I) -> Result<()>
where
    I: IntoIterator<Item = &'a String>,
{
    for email in emails {
        if !is_valid_email(email) {
            return Err(AppError::Validation(format!(
                "Invalid email address: {}",
                email
            )));
        }
    }
    Ok(())
}

/// Header a recipient is addressed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    #[default]
    To,
    Cc,
}

impl RecipientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientType::To => "to",
            RecipientType::Cc => "cc",
        }
    }
}

impl fmt::Display for RecipientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecipientType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "to" => Ok(RecipientType::To),
            "cc" => Ok(RecipientType::Cc),
            other => Err(format!("unknown recipient type: {}", other)),
        }
    }
}

/// A saved address owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "type", default)]
    pub recipient_type: RecipientType,
    /// At most one recipient per (owner, type) carries this flag
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecipientRequest {
    pub name: String,
    pub email: String,
    #[serde(rename = "type", default)]
    pub recipient_type: RecipientType,
    #[serde(default)]
    pub is_default: bool,
}

impl CreateRecipientRequest {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_emails([&self.email])
    }
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecipientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub recipient_type: Option<RecipientType>,
    pub is_default: Option<bool>,
}

impl UpdateRecipientRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(email) = &self.email {
            validate_emails([email])?;
        }
        Ok(())
    }

    pub fn apply(self, recipient: &mut Recipient) {
        if let Some(name) = self.name {
            recipient.name = name;
        }
        if let Some(email) = self.email {
            recipient.email = email;
        }
        if let Some(recipient_type) = self.recipient_type {
            recipient.recipient_type = recipient_type;
        }
        if let Some(is_default) = self.is_default {
            recipient.is_default = is_default;
        }
    }
}

/// Name/address pair shown for default recipients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipientSummary {
    pub name: String,
    pub email: String,
}

impl From<&Recipient> for RecipientSummary {
    fn from(recipient: &Recipient) -> Self {
        Self {
            name: recipient.name.clone(),
            email: recipient.email.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct DefaultRecipientsResponse {
    pub to: Vec<RecipientSummary>,
    pub cc: Vec<RecipientSummary>,
}

fn validate_name(name: &str) -> Result<()> {
    let len = name.trim().chars().count();
    if len == 0 || len > 256 {
        return Err(AppError::Validation(
            "Name must be 1-256 characters".to_string(),
        ));
    }
    Ok(())
}
