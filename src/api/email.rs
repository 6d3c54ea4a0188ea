//! Send, history and preview endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::email::{EmailLogResponse, SendEmailRequest, SendEmailResponse, SendTemplateRequest};
use crate::error::Result;
use crate::server::AppState;
use crate::template::TemplatePreview;

/// POST /api/email/send - Send caller-authored subject and body
#[tracing::instrument(name = "http.send_email", skip_all, fields(user_id = %user.id))]
pub async fn send_email(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>> {
    let response = state.email.send_custom(&user, request).await?;
    Ok(Json(response))
}

/// POST /api/email/send-template - Send a saved template
#[tracing::instrument(
    name = "http.send_template",
    skip_all,
    fields(user_id = %user.id, template_id = %request.template_id)
)]
pub async fn send_template(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SendTemplateRequest>,
) -> Result<Json<SendEmailResponse>> {
    let response = state.email.send_template(&user, request).await?;
    Ok(Json(response))
}

/// GET /api/email/logs - Newest first
#[tracing::instrument(name = "http.email_logs", skip_all, fields(user_id = %user.id))]
pub async fn email_logs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<EmailLogResponse>>> {
    Ok(Json(state.email.logs(&user).await?))
}

/// GET /api/email/preview-template/{id}
#[tracing::instrument(name = "http.preview_template", skip_all, fields(template_id = %id))]
pub async fn preview_template(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<TemplatePreview>> {
    Ok(Json(state.email.preview(&user, id).await?))
}
