//! Template types and request definitions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Template category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Leave,
    Complaint,
    Request,
    Announcement,
    #[default]
    Other,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Leave => "leave",
            TemplateCategory::Complaint => "complaint",
            TemplateCategory::Request => "request",
            TemplateCategory::Announcement => "announcement",
            TemplateCategory::Other => "other",
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "leave" => Ok(TemplateCategory::Leave),
            "complaint" => Ok(TemplateCategory::Complaint),
            "request" => Ok(TemplateCategory::Request),
            "announcement" => Ok(TemplateCategory::Announcement),
            "other" => Ok(TemplateCategory::Other),
            other => Err(format!("unknown template category: {}", other)),
        }
    }
}

/// An email template owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Human-readable template name
    pub name: String,

    #[serde(default)]
    pub category: TemplateCategory,

    /// Subject pattern with {{variable}} placeholders
    pub subject: String,

    /// Body pattern with {{variable}} placeholders
    pub body: String,

    /// Placeholder names found in subject and body (UI metadata only)
    #[serde(default)]
    pub variables: Vec<String>,

    /// At most one template per owner carries this flag
    #[serde(default)]
    pub is_default: bool,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Request to create a new template
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,

    #[serde(default)]
    pub category: TemplateCategory,

    pub subject: String,

    pub body: String,

    #[serde(default)]
    pub is_default: bool,
}

impl CreateTemplateRequest {
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_subject(&self.subject)
    }
}

/// Request to update an existing template; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub category: Option<TemplateCategory>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub is_default: Option<bool>,
}

impl UpdateTemplateRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(subject) = &self.subject {
            validate_subject(subject)?;
        }
        Ok(())
    }
}

/// Field-level changes merged into a stored template
#[derive(Debug, Clone, Default)]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub category: Option<TemplateCategory>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub variables: Option<Vec<String>>,
    pub is_default: Option<bool>,
}

impl TemplatePatch {
    /// Apply the patch in place
    pub fn apply(self, template: &mut Template) {
        if let Some(name) = self.name {
            template.name = name;
        }
        if let Some(category) = self.category {
            template.category = category;
        }
        if let Some(subject) = self.subject {
            template.subject = subject;
        }
        if let Some(body) = self.body {
            template.body = body;
        }
        if let Some(variables) = self.variables {
            template.variables = variables;
        }
        if let Some(is_default) = self.is_default {
            template.is_default = is_default;
        }
    }
}

/// Template preview with auto-filled values and the caller's default recipients
#[derive(Debug, Serialize)]
pub struct TemplatePreview {
    pub template_name: String,
    pub subject: String,
    pub body: String,
    pub variables: Vec<String>,
    pub default_to: Vec<crate::recipient::RecipientSummary>,
    pub default_cc: Vec<crate::recipient::RecipientSummary>,
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

fn validate_subject(subject: &str) -> Result<()> {
    if subject.trim().is_empty() {
        return Err(AppError::Validation("Subject is required".to_string()));
    }
    Ok(())
}
