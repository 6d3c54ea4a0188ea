//! Shared fixtures: memory storage, a recording mail transport and a canned
//! OAuth provider.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use email_trigger_service::auth::{OAuthError, OAuthProvider, TokenSet, UserInfo};
use email_trigger_service::config::{
    AdminConfig, DatabaseConfig, GmailConfig, OAuthConfig, OtelConfig, ServerConfig,
    SessionConfig, Settings,
};
use email_trigger_service::email::{MailTransport, OutgoingEmail, TransportError};
use email_trigger_service::server::AppState;
use email_trigger_service::storage::{MemoryStorage, StorageBackend, UserStore};
use email_trigger_service::user::User;

pub const SESSION_SECRET: &str = "integration-test-secret";

/// Records every message; fails every send when `fail` is set
#[derive(Default)]
pub struct RecordingTransport {
    pub fail: bool,
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingTransport {
    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<OutgoingEmail> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(
        &self,
        _access_token: &str,
        email: &OutgoingEmail,
    ) -> Result<String, TransportError> {
        if self.fail {
            return Err(TransportError::Rejected {
                status: 503,
                body: "mail service unavailable".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(format!("msg-{}", sent.len()))
    }
}

/// Returns the configured profile for any authorization code
pub struct StaticOAuthProvider {
    pub profile: UserInfo,
}

impl StaticOAuthProvider {
    pub fn new(google_id: &str, email: &str, name: &str) -> Self {
        Self {
            profile: UserInfo {
                id: google_id.to_string(),
                email: email.to_string(),
                name: Some(name.to_string()),
            },
        }
    }
}

#[async_trait]
impl OAuthProvider for StaticOAuthProvider {
    fn authorization_url(&self, state: &str) -> Result<String, OAuthError> {
        Ok(format!("https://accounts.example.com/consent?state={}", state))
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenSet, OAuthError> {
        if code == "bad-code" {
            return Err(OAuthError::Rejected {
                status: 400,
                body: "invalid_grant".to_string(),
            });
        }
        Ok(TokenSet {
            access_token: format!("access-{}", code),
            refresh_token: Some("refresh-token".to_string()),
            expires_in: Some(3600),
        })
    }

    async fn refresh_access_token(&self, _refresh_token: &str) -> Result<TokenSet, OAuthError> {
        Ok(TokenSet {
            access_token: "refreshed-access".to_string(),
            refresh_token: None,
            expires_in: Some(3600),
        })
    }

    async fn user_info(&self, _access_token: &str) -> Result<UserInfo, OAuthError> {
        Ok(self.profile.clone())
    }
}

pub fn test_settings(admin_emails: &[&str]) -> Settings {
    Settings {
        server: ServerConfig::default(),
        session: SessionConfig::new(SESSION_SECRET),
        oauth: OAuthConfig::new("client-id", "client-secret"),
        gmail: GmailConfig::default(),
        database: DatabaseConfig::default(),
        admin: AdminConfig {
            emails: admin_emails.iter().map(|e| e.to_string()).collect(),
        },
        otel: OtelConfig::default(),
    }
}

pub struct TestEnv {
    pub store: Arc<MemoryStorage>,
    pub transport: Arc<RecordingTransport>,
    pub state: AppState,
}

pub fn test_env(transport: RecordingTransport) -> TestEnv {
    let store = Arc::new(MemoryStorage::new());
    let transport = Arc::new(transport);
    let oauth = Arc::new(StaticOAuthProvider::new(
        "google-new",
        "newcomer@example.com",
        "Newcomer",
    ));

    let state = AppState::new(
        test_settings(&["admin@example.com"]),
        store.clone() as Arc<dyn StorageBackend>,
        oauth,
        transport.clone(),
    );

    TestEnv {
        store,
        transport,
        state,
    }
}

pub async fn insert_user(store: &MemoryStorage, email: &str, name: &str, is_admin: bool) -> User {
    let mut user = User::new(email, name, format!("google-{}", email), "access-token");
    user.is_admin = is_admin;
    store.insert_user(user).await.unwrap()
}
