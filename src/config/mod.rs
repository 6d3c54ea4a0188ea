mod settings;

pub use settings::{
    AdminConfig, DatabaseConfig, GmailConfig, OAuthConfig, OtelConfig, ServerConfig,
    SessionConfig, Settings,
};
