//! API layer - HTTP endpoint handlers organized by resource.

mod admin;
mod auth;
mod email;
mod health;
mod metrics;
mod recipients;
mod routes;
mod templates;

use serde::Serialize;

pub use admin::BulkCreateResponse;
pub use auth::{CallbackParams, MeResponse};
pub use health::{health, HealthResponse};
pub use metrics::prometheus_metrics;
pub use routes::api_routes;

/// Body returned by delete endpoints
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub message: String,
}

impl DeletedResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
