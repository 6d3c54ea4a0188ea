//! OAuth 2.0 authorization-code client for the identity provider.
//!
//! The provider issues the access token used both to read the user's
//! profile and to send mail on their behalf.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::config::OAuthConfig;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Provider returned an error: {0}")]
    Provider(String),

    #[error("Missing authorization code")]
    MissingCode,

    #[error("Invalid OAuth state")]
    StateMismatch,

    #[error("No refresh token stored for this account")]
    NoRefreshToken,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token endpoint rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid provider configuration: {0}")]
    Config(String),
}

/// Tokens returned by the token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenSet {
    /// Absolute expiry computed from `expires_in` as of `now`
    pub fn expiry_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in
            .map(|seconds| now + chrono::Duration::seconds(seconds))
    }
}

/// Profile returned by the userinfo endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    /// Provider subject identifier
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl UserInfo {
    /// Display name, falling back to the address when the profile has none
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => self.email.clone(),
        }
    }
}

/// Identity provider operations used by sign-in and credential refresh
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Consent URL the browser is redirected to
    fn authorization_url(&self, state: &str) -> Result<String, OAuthError>;

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, OAuthError>;

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenSet, OAuthError>;

    async fn user_info(&self, access_token: &str) -> Result<UserInfo, OAuthError>;
}

/// Google OAuth 2.0 client
pub struct GoogleOAuthClient {
    http: Client,
    config: OAuthConfig,
    redirect_uri: String,
}

impl GoogleOAuthClient {
    pub fn new(config: OAuthConfig, redirect_uri: String) -> Result<Self, OAuthError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            config,
            redirect_uri,
        })
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenSet, OAuthError> {
        let response = self
            .http
            .post(&self.config.token_uri)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<TokenSet>().await?)
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn authorization_url(&self, state: &str) -> Result<String, OAuthError> {
        let scope = self.config.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.config.auth_uri,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("include_granted_scopes", "true"),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::Config(e.to_string()))?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, OAuthError> {
        self.token_request(&[
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenSet, OAuthError> {
        self.token_request(&[
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn user_info(&self, access_token: &str) -> Result<UserInfo, OAuthError> {
        let response = self
            .http
            .get(&self.config.userinfo_uri)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<UserInfo>().await?)
    }
}
