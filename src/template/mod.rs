//! Email template system.
//!
//! This module provides:
//! - Template definitions with `{{variable}}` placeholders
//! - The variable resolver used for sending and previewing
//! - Owner-scoped CRUD with the single-default rule
//! - Starter templates seeded for new accounts
//!
//! # Example
//!
//! ```ignore
//! let ctx = ResolveContext::new("Asha", "asha@example.com");
//! let overrides = HashMap::from([("reason".to_string(), "family event".to_string())]);
//!
//! let subject = resolve("Leave - {{date}}", &overrides, &ctx);
//! let body = resolve("Reason: {{reason}}. Regards, {{name}}", &overrides, &ctx);
//! ```

mod seed;
mod service;
mod substitution;
mod types;

pub use seed::seeded_templates;
pub use service::TemplateService;
pub use substitution::{
    auto_fill_variables, extract_placeholders, resolve, resolve_on, template_variables,
    ResolveContext,
};
pub use types::{
    CreateTemplateRequest, Template, TemplateCategory, TemplatePatch, TemplatePreview,
    UpdateTemplateRequest,
};
