use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

/// An authenticated account with its mail-provider credentials
#[derive(Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    /// Subject identifier issued by the OAuth provider
    pub google_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
    /// Computed at every login from the configured allow-list
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        google_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            name: name.into(),
            google_id: google_id.into(),
            access_token: access_token.into(),
            refresh_token: None,
            token_expiry: None,
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    /// Whether the access token expires within `leeway` of now.
    /// A token without a recorded expiry is treated as valid.
    pub fn token_expires_within(&self, leeway: Duration) -> bool {
        match self.token_expiry {
            Some(expiry) => expiry - leeway <= Utc::now(),
            None => false,
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("is_admin", &self.is_admin)
            .field("token_expiry", &self.token_expiry)
            .finish_non_exhaustive()
    }
}

/// Credential and role changes written on login or token refresh
#[derive(Debug, Clone, Default)]
pub struct TokenUpdate {
    pub access_token: String,
    /// `None` keeps the stored refresh token
    pub refresh_token: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
    /// `None` keeps the stored admin flag
    pub is_admin: Option<bool>,
}

impl TokenUpdate {
    pub fn apply(self, user: &mut User) {
        user.access_token = self.access_token;
        if let Some(refresh_token) = self.refresh_token {
            user.refresh_token = Some(refresh_token);
        }
        user.token_expiry = self.token_expiry;
        if let Some(is_admin) = self.is_admin {
            user.is_admin = is_admin;
        }
    }
}

/// Public view of a user (no credentials)
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

/// Which owners' records an operation may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    /// Only records owned by this user
    Owner(Uuid),
    /// Any record (admin operations)
    Admin,
}

impl AccessScope {
    pub fn permits(&self, owner: Uuid) -> bool {
        match self {
            AccessScope::Owner(id) => *id == owner,
            AccessScope::Admin => true,
        }
    }

    /// Owner filter for storage queries; `None` for admin scope
    pub fn owner(&self) -> Option<Uuid> {
        match self {
            AccessScope::Owner(id) => Some(*id),
            AccessScope::Admin => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expiry_check() {
        let mut user = User::new("a@example.com", "A", "g-1", "token");
        assert!(!user.token_expires_within(Duration::seconds(60)));

        user.token_expiry = Some(Utc::now() + Duration::seconds(30));
        assert!(user.token_expires_within(Duration::seconds(60)));

        user.token_expiry = Some(Utc::now() + Duration::hours(1));
        assert!(!user.token_expires_within(Duration::seconds(60)));
    }

    #[test]
    fn test_token_update_keeps_refresh_token() {
        let mut user = User::new("a@example.com", "A", "g-1", "old");
        user.refresh_token = Some("refresh".to_string());

        TokenUpdate {
            access_token: "new".to_string(),
            refresh_token: None,
            token_expiry: None,
            is_admin: Some(true),
        }
        .apply(&mut user);

        assert_eq!(user.access_token, "new");
        assert_eq!(user.refresh_token.as_deref(), Some("refresh"));
        assert!(user.is_admin);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let user = User::new("a@example.com", "A", "g-1", "secret-access-token");
        let debug = format!("{:?}", user);
        assert!(!debug.contains("secret-access-token"));
    }

    #[test]
    fn test_access_scope() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(AccessScope::Owner(owner).permits(owner));
        assert!(!AccessScope::Owner(owner).permits(other));
        assert!(AccessScope::Admin.permits(other));
        assert_eq!(AccessScope::Admin.owner(), None);
    }
}
