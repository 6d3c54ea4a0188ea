//! Admin endpoints. Every handler requires an admin session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::error::Result;
use crate::recipient::{CreateRecipientRequest, Recipient};
use crate::server::AppState;
use crate::template::{CreateTemplateRequest, Template, UpdateTemplateRequest};
use crate::user::{AccessScope, UserResponse};

use super::DeletedResponse;

#[derive(Debug, Serialize)]
pub struct BulkCreateResponse {
    pub success: bool,
    pub count: usize,
    pub message: String,
}

impl BulkCreateResponse {
    fn new(count: usize, what: &str) -> Self {
        Self {
            success: true,
            count,
            message: format!("{} created for {} users", what, count),
        }
    }
}

#[tracing::instrument(name = "http.admin_list_users", skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<UserResponse>>> {
    Ok(Json(state.users.list().await?))
}

/// DELETE /api/admin/users/{id} - Remove a user and everything they own
#[tracing::instrument(name = "http.admin_delete_user", skip_all, fields(user_id = %id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>> {
    state.users.delete_with_cascade(&admin, id).await?;
    Ok(Json(DeletedResponse::new("User deleted")))
}

#[tracing::instrument(name = "http.admin_list_templates", skip_all)]
pub async fn list_all_templates(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Template>>> {
    Ok(Json(state.templates.list(AccessScope::Admin).await?))
}

#[tracing::instrument(name = "http.admin_list_user_templates", skip_all, fields(user_id = %user_id))]
pub async fn list_user_templates(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<Template>>> {
    state.users.ensure_exists(user_id).await?;
    Ok(Json(state.templates.list(AccessScope::Owner(user_id)).await?))
}

#[tracing::instrument(name = "http.admin_create_template", skip_all, fields(user_id = %user_id))]
pub async fn create_user_template(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<Template>)> {
    state.users.ensure_exists(user_id).await?;
    let created = state.templates.create(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(name = "http.admin_update_template", skip_all, fields(template_id = %id))]
pub async fn update_any_template(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<Template>> {
    Ok(Json(
        state.templates.update(AccessScope::Admin, id, request).await?,
    ))
}

#[tracing::instrument(name = "http.admin_delete_template", skip_all, fields(template_id = %id))]
pub async fn delete_any_template(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>> {
    state.templates.delete(AccessScope::Admin, id).await?;
    Ok(Json(DeletedResponse::new("Template deleted")))
}

/// POST /api/admin/templates/bulk-create - One non-default copy per user
#[tracing::instrument(name = "http.admin_bulk_templates", skip_all)]
pub async fn bulk_create_templates(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<BulkCreateResponse>)> {
    let count = state.templates.bulk_create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(BulkCreateResponse::new(count, "Template")),
    ))
}

#[tracing::instrument(name = "http.admin_list_recipients", skip_all)]
pub async fn list_all_recipients(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Recipient>>> {
    Ok(Json(state.recipients.list(AccessScope::Admin).await?))
}

#[tracing::instrument(name = "http.admin_create_recipient", skip_all, fields(user_id = %user_id))]
pub async fn create_user_recipient(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(request): Json<CreateRecipientRequest>,
) -> Result<(StatusCode, Json<Recipient>)> {
    state.users.ensure_exists(user_id).await?;
    let created = state.recipients.create(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(name = "http.admin_delete_recipient", skip_all, fields(recipient_id = %id))]
pub async fn delete_any_recipient(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>> {
    state.recipients.delete(AccessScope::Admin, id).await?;
    Ok(Json(DeletedResponse::new("Recipient deleted")))
}

/// POST /api/admin/recipients/bulk-create - One copy per user; a default
/// flag replaces each user's current default for that direction
#[tracing::instrument(name = "http.admin_bulk_recipients", skip_all)]
pub async fn bulk_create_recipients(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(request): Json<CreateRecipientRequest>,
) -> Result<(StatusCode, Json<BulkCreateResponse>)> {
    let count = state.recipients.bulk_create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(BulkCreateResponse::new(count, "Recipient")),
    ))
}
