use axum::{
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::{admin, auth, email, health::health, metrics::prometheus_metrics, recipients, templates};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        // Sign-in
        .route("/auth/login", get(auth::login))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/logout", get(auth::logout))
        .nest(
            "/api",
            Router::new()
                .route("/me", get(auth::me))
                // Templates
                .route(
                    "/templates",
                    get(templates::list_templates).post(templates::create_template),
                )
                .route(
                    "/templates/{id}",
                    get(templates::get_template)
                        .put(templates::update_template)
                        .delete(templates::delete_template),
                )
                // Recipients
                .route(
                    "/recipients",
                    get(recipients::list_recipients).post(recipients::create_recipient),
                )
                .route("/recipients/defaults", get(recipients::default_recipients))
                .route(
                    "/recipients/{id}",
                    get(recipients::get_recipient)
                        .put(recipients::update_recipient)
                        .delete(recipients::delete_recipient),
                )
                // Email
                .route("/email/send", post(email::send_email))
                .route("/email/send-template", post(email::send_template))
                .route("/email/logs", get(email::email_logs))
                .route("/email/preview-template/{id}", get(email::preview_template))
                .nest("/admin", admin_routes()),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", axum::routing::delete(admin::delete_user))
        .route("/templates", get(admin::list_all_templates))
        .route(
            "/templates/user/{user_id}",
            get(admin::list_user_templates).post(admin::create_user_template),
        )
        .route(
            "/templates/{id}",
            axum::routing::put(admin::update_any_template).delete(admin::delete_any_template),
        )
        .route("/templates/bulk-create", post(admin::bulk_create_templates))
        .route("/recipients", get(admin::list_all_recipients))
        .route("/recipients/user/{user_id}", post(admin::create_user_recipient))
        .route(
            "/recipients/{id}",
            axum::routing::delete(admin::delete_any_recipient),
        )
        .route("/recipients/bulk-create", post(admin::bulk_create_recipients))
}
