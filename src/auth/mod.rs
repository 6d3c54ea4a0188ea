//! Sign-in, session tokens and provider credentials.

mod claims;
mod credentials;
mod extract;
mod jwt;
mod login;
mod oauth;

pub use claims::SessionClaims;
pub use credentials::{CredentialProvider, REFRESH_LEEWAY_SECONDS};
pub use extract::{authenticate, session_token, AdminUser, CurrentUser};
pub use jwt::{SessionError, SessionManager, OAUTH_STATE_COOKIE};
pub use login::{generate_state, SignIn, SignInService};
pub use oauth::{GoogleOAuthClient, OAuthError, OAuthProvider, TokenSet, UserInfo};
