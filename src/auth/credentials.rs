//! Access-token refresh ahead of each send

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::storage::StorageBackend;
use crate::user::{TokenUpdate, User};

use super::oauth::{OAuthError, OAuthProvider};

/// Tokens expiring within this window are refreshed before use
pub const REFRESH_LEEWAY_SECONDS: i64 = 60;

/// Supplies a usable access token for a user, refreshing it when stale
#[derive(Clone)]
pub struct CredentialProvider {
    store: Arc<dyn StorageBackend>,
    oauth: Arc<dyn OAuthProvider>,
}

impl CredentialProvider {
    pub fn new(store: Arc<dyn StorageBackend>, oauth: Arc<dyn OAuthProvider>) -> Self {
        Self { store, oauth }
    }

    /// Current access token for `user`.
    ///
    /// A stale token with a stored refresh token is refreshed and the new
    /// token and expiry are persisted. A stale token without one is returned
    /// as-is and left for the transport to reject.
    pub async fn access_token(&self, user: &User) -> Result<String, OAuthError> {
        if !user.token_expires_within(Duration::seconds(REFRESH_LEEWAY_SECONDS)) {
            return Ok(user.access_token.clone());
        }

        let Some(refresh_token) = user.refresh_token.as_deref() else {
            tracing::warn!(
                user_id = %user.id,
                "Access token is stale and no refresh token is stored"
            );
            return Ok(user.access_token.clone());
        };

        let tokens = self.oauth.refresh_access_token(refresh_token).await?;
        let update = TokenUpdate {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            token_expiry: tokens.expiry_from(Utc::now()),
            is_admin: None,
        };

        if let Err(e) = self.store.update_user_tokens(user.id, update).await {
            tracing::warn!(
                user_id = %user.id,
                error = %e,
                "Failed to persist refreshed access token"
            );
        } else {
            tracing::debug!(user_id = %user.id, "Access token refreshed");
        }

        Ok(tokens.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenSet, UserInfo};
    use crate::storage::{MemoryStorage, UserStore};
    use async_trait::async_trait;

    struct RefreshingProvider;

    #[async_trait]
    impl OAuthProvider for RefreshingProvider {
        fn authorization_url(&self, _state: &str) -> Result<String, OAuthError> {
            Ok(String::new())
        }

        async fn exchange_code(&self, _code: &str) -> Result<TokenSet, OAuthError> {
            Err(OAuthError::MissingCode)
        }

        async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenSet, OAuthError> {
            if refresh_token == "revoked" {
                return Err(OAuthError::Rejected {
                    status: 400,
                    body: "invalid_grant".to_string(),
                });
            }
            Ok(TokenSet {
                access_token: "fresh".to_string(),
                refresh_token: None,
                expires_in: Some(3600),
            })
        }

        async fn user_info(&self, _access_token: &str) -> Result<UserInfo, OAuthError> {
            Err(OAuthError::MissingCode)
        }
    }

    async fn setup(expiry_offset: i64, refresh: Option<&str>) -> (Arc<MemoryStorage>, User) {
        let store = Arc::new(MemoryStorage::new());
        let mut user = User::new("asha@example.com", "Asha", "g-1", "stale");
        user.token_expiry = Some(Utc::now() + Duration::seconds(expiry_offset));
        user.refresh_token = refresh.map(str::to_string);
        let user = store.insert_user(user).await.unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_fresh_token_is_reused() {
        let (store, user) = setup(3600, Some("refresh")).await;
        let provider = CredentialProvider::new(store, Arc::new(RefreshingProvider));

        assert_eq!(provider.access_token(&user).await.unwrap(), "stale");
    }

    #[tokio::test]
    async fn test_expiring_token_is_refreshed_and_persisted() {
        let (store, user) = setup(30, Some("refresh")).await;
        let provider = CredentialProvider::new(store.clone(), Arc::new(RefreshingProvider));

        assert_eq!(provider.access_token(&user).await.unwrap(), "fresh");

        let stored = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.access_token, "fresh");
        assert_eq!(stored.refresh_token.as_deref(), Some("refresh"));
        assert!(stored.token_expiry.unwrap() > Utc::now() + Duration::seconds(3000));
    }

    #[tokio::test]
    async fn test_stale_token_without_refresh_token() {
        let (store, user) = setup(-10, None).await;
        let provider = CredentialProvider::new(store, Arc::new(RefreshingProvider));

        assert_eq!(provider.access_token(&user).await.unwrap(), "stale");
    }

    #[tokio::test]
    async fn test_refresh_rejection_is_an_error() {
        let (store, user) = setup(-10, Some("revoked")).await;
        let provider = CredentialProvider::new(store, Arc::new(RefreshingProvider));

        let err = provider.access_token(&user).await.unwrap_err();
        assert!(matches!(err, OAuthError::Rejected { status: 400, .. }));
    }
}
