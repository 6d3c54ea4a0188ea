//! Sign-in via the OAuth authorization-code flow

use std::sync::Arc;

use chrono::Utc;
use rand::{distr::Alphanumeric, Rng};

use crate::config::AdminConfig;
use crate::error::Result;
use crate::metrics::AccountMetrics;
use crate::storage::StorageBackend;
use crate::template::TemplateService;
use crate::user::{TokenUpdate, User};

use super::oauth::{OAuthError, OAuthProvider};

const STATE_LENGTH: usize = 32;

/// Random value binding the consent redirect to the callback
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// Result of a completed sign-in
#[derive(Debug)]
pub struct SignIn {
    pub user: User,
    pub is_new: bool,
}

#[derive(Clone)]
pub struct SignInService {
    store: Arc<dyn StorageBackend>,
    oauth: Arc<dyn OAuthProvider>,
    templates: TemplateService,
    admin: AdminConfig,
}

impl SignInService {
    pub fn new(
        store: Arc<dyn StorageBackend>,
        oauth: Arc<dyn OAuthProvider>,
        admin: AdminConfig,
    ) -> Self {
        Self {
            templates: TemplateService::new(store.clone()),
            store,
            oauth,
            admin,
        }
    }

    /// Consent URL and the state value it carries
    pub fn begin(&self) -> Result<(String, String)> {
        let state = generate_state();
        let url = self.oauth.authorization_url(&state)?;
        Ok((url, state))
    }

    /// Finish sign-in with the code returned to the callback.
    ///
    /// A returning user gets fresh tokens and a recomputed admin flag; the
    /// stored refresh token is kept when the provider does not send a new
    /// one. A new user is created and seeded with starter templates.
    pub async fn complete(&self, code: &str) -> Result<SignIn> {
        if code.is_empty() {
            return Err(OAuthError::MissingCode.into());
        }

        let tokens = self.oauth.exchange_code(code).await?;
        let info = self.oauth.user_info(&tokens.access_token).await?;
        let is_admin = self.admin.is_admin_email(&info.email);
        let token_expiry = tokens.expiry_from(Utc::now());

        if let Some(existing) = self.store.find_user_by_google_id(&info.id).await? {
            let update = TokenUpdate {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                token_expiry,
                is_admin: Some(is_admin),
            };
            let user = self
                .store
                .update_user_tokens(existing.id, update)
                .await?
                .unwrap_or(existing);

            AccountMetrics::record_login(false);
            tracing::info!(user_id = %user.id, is_admin = user.is_admin, "User signed in");
            return Ok(SignIn {
                user,
                is_new: false,
            });
        }

        let mut user = User::new(
            info.email.clone(),
            info.display_name(),
            info.id.clone(),
            tokens.access_token,
        );
        user.refresh_token = tokens.refresh_token;
        user.token_expiry = token_expiry;
        user.is_admin = is_admin;

        let user = self.store.insert_user(user).await?;
        let seeded = self.templates.seed_for_user(user.id).await?;

        AccountMetrics::record_login(true);
        tracing::info!(
            user_id = %user.id,
            is_admin = user.is_admin,
            seeded_templates = seeded,
            "New user registered"
        );

        Ok(SignIn {
            user,
            is_new: true,
        })
    }
}
