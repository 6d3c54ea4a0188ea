//! Saved recipients addressed through `to` or `cc`.

mod service;
mod types;

pub use service::RecipientService;
pub use types::{
    is_valid_email, validate_emails, CreateRecipientRequest, DefaultRecipientsResponse,
    Recipient, RecipientSummary, RecipientType, UpdateRecipientRequest,
};
