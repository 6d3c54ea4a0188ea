//! User identity, stored transport credentials and access scoping.

mod service;
mod types;

pub use service::UserService;
pub use types::{AccessScope, TokenUpdate, User, UserResponse};
