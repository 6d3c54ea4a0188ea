//! Outbound email: message building, transport and send history.

mod dispatcher;
mod mime;
mod transport;
mod types;

pub use dispatcher::{EmailDispatcher, LOG_LIST_LIMIT};
pub use mime::build_message;
pub use transport::{GmailTransport, MailTransport, TransportError};
pub use types::{
    EmailLog, EmailLogResponse, EmailStatus, OutgoingEmail, SendEmailRequest, SendEmailResponse,
    SendOutcome, SendTemplateRequest,
};
