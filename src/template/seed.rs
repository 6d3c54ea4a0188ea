//! Starter templates created for every new account

use chrono::Utc;
use uuid::Uuid;

use super::substitution::template_variables;
use super::types::{Template, TemplateCategory};

const LEAVE_BODY: &str = "Dear Sir/Madam,

I, {{name}}, am writing to request leave from {{from_date}} to {{to_date}}.

Reason: {{reason}}

I request you to kindly grant me leave for the mentioned period.

Thank you.

Regards,
{{name}}";

const LATE_ENTRY_BODY: &str = "Dear Warden,

I, {{name}}, request permission for late entry on {{date}}.

Reason: {{reason}}

I will ensure this does not become a regular occurrence.

Regards,
{{name}}";

const COMPLAINT_BODY: &str = "Dear Warden,

I am writing to bring to your attention the following matter:

{{details}}

I request you to kindly look into this matter.

Thank you.

Regards,
{{name}}";

/// The three templates seeded at account creation. Only the leave
/// application is marked default.
pub fn seeded_templates(user_id: Uuid) -> Vec<Template> {
    [
        (
            "Leave Application",
            TemplateCategory::Leave,
            "Leave Application - {{date}}",
            LEAVE_BODY,
            true,
        ),
        (
            "Late Entry Request",
            TemplateCategory::Request,
            "Request for Late Entry - {{date}}",
            LATE_ENTRY_BODY,
            false,
        ),
        (
            "General Complaint",
            TemplateCategory::Complaint,
            "Complaint - {{subject}}",
            COMPLAINT_BODY,
            false,
        ),
    ]
    .into_iter()
    .map(|(name, category, subject, body, is_default)| Template {
        id: Uuid::new_v4(),
        user_id,
        name: name.to_string(),
        category,
        subject: subject.to_string(),
        body: body.to_string(),
        variables: template_variables(subject, body),
        is_default,
        created_at: Utc::now(),
    })
    .collect()
}
