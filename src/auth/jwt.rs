use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::AppError;

use super::SessionClaims;

/// Cookie carrying the OAuth `state` between login and callback
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Token subject is not a user id")]
    MalformedSubject,
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

/// Issues and validates HS256 session tokens and builds the session cookie
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
    cookie_name: String,
    secure_cookie: bool,
}

impl SessionManager {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation: Validation::default(),
            ttl_seconds: config.ttl_seconds,
            cookie_name: config.cookie_name.clone(),
            secure_cookie: config.secure_cookie,
        }
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, SessionError> {
        let claims = SessionClaims::new(user_id, self.ttl_seconds);
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Validate a token and return the user id it was issued for
    pub fn validate(&self, token: &str) -> Result<Uuid, SessionError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        token_data
            .claims
            .user_id()
            .ok_or(SessionError::MalformedSubject)
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .secure(self.secure_cookie)
            .same_site(SameSite::Lax)
            .build()
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), "")).path("/").build()
    }

    pub fn state_cookie(&self, state: String) -> Cookie<'static> {
        Cookie::build((OAUTH_STATE_COOKIE, state))
            .path("/auth")
            .http_only(true)
            .secure(self.secure_cookie)
            .same_site(SameSite::Lax)
            .build()
    }

    pub fn state_removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((OAUTH_STATE_COOKIE, "")).path("/auth").build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_manager() -> SessionManager {
        SessionManager::new(&SessionConfig::new("test-secret-key-for-testing"))
    }

    #[test]
    fn test_issue_and_validate() {
        let manager = create_test_manager();
        let user_id = Uuid::new_v4();

        let token = manager.issue(user_id).unwrap();
        assert_eq!(manager.validate(&token).unwrap(), user_id);
    }

    #[test]
    fn test_invalid_token() {
        let manager = create_test_manager();
        assert!(manager.validate("invalid-token").is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = SessionManager::new(&SessionConfig::new("another-secret"));
        let token = other.issue(Uuid::new_v4()).unwrap();

        assert!(create_test_manager().validate(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = create_test_manager();
        let claims = SessionClaims {
            sub: Uuid::new_v4().to_string(),
            exp: chrono::Utc::now().timestamp() - 3600,
            iat: chrono::Utc::now().timestamp() - 7200,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret-key-for-testing".as_bytes()),
        )
        .unwrap();

        assert!(manager.validate(&token).is_err());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let manager = create_test_manager();
        let cookie = manager.session_cookie("abc".to_string());

        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
