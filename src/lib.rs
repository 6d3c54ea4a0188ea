// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod storage;
pub mod telemetry;

// Domain
pub mod defaults;
pub mod email;
pub mod recipient;
pub mod template;
pub mod user;

// Application layer
pub mod api;
pub mod auth;
pub mod server;
