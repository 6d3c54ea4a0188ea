//! Mail transport over the Gmail REST API

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE, Engine};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::config::GmailConfig;

use super::mime::build_message;
use super::types::OutgoingEmail;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mail API rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid mail API response: {0}")]
    InvalidResponse(String),

    #[error("Could not obtain credentials: {0}")]
    Credentials(String),
}

/// Delivers a resolved message on behalf of a user
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send `email` and return the provider's message identifier
    async fn send(&self, access_token: &str, email: &OutgoingEmail)
        -> Result<String, TransportError>;
}

#[derive(Deserialize)]
struct SendResponse {
    id: Option<String>,
}

pub struct GmailTransport {
    http: Client,
    api_base_url: String,
}

impl GmailTransport {
    pub fn new(config: &GmailConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn send_url(&self) -> String {
        format!("{}/gmail/v1/users/me/messages/send", self.api_base_url)
    }
}

#[async_trait]
impl MailTransport for GmailTransport {
    async fn send(
        &self,
        access_token: &str,
        email: &OutgoingEmail,
    ) -> Result<String, TransportError> {
        let raw = URL_SAFE.encode(build_message(email).as_bytes());

        let response = self
            .http
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&json!({ "raw": raw }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: SendResponse = response.json().await?;
        body.id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| TransportError::InvalidResponse("missing message id".to_string()))
    }
}
