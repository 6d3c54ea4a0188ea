//! Template CRUD endpoints for the signed-in user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::Result;
use crate::server::AppState;
use crate::template::{CreateTemplateRequest, Template, UpdateTemplateRequest};
use crate::user::AccessScope;

use super::DeletedResponse;

/// GET /api/templates - List the caller's templates
#[tracing::instrument(name = "http.list_templates", skip_all, fields(user_id = %user.id))]
pub async fn list_templates(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Template>>> {
    let templates = state.templates.list(AccessScope::Owner(user.id)).await?;
    Ok(Json(templates))
}

/// GET /api/templates/{id}
#[tracing::instrument(name = "http.get_template", skip_all, fields(template_id = %id))]
pub async fn get_template(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Template>> {
    let template = state.templates.get(AccessScope::Owner(user.id), id).await?;
    Ok(Json(template))
}

/// POST /api/templates
#[tracing::instrument(name = "http.create_template", skip_all, fields(user_id = %user.id))]
pub async fn create_template(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<Template>)> {
    let created = state.templates.create(user.id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/templates/{id} - Partial update
#[tracing::instrument(name = "http.update_template", skip_all, fields(template_id = %id))]
pub async fn update_template(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTemplateRequest>,
) -> Result<Json<Template>> {
    let updated = state
        .templates
        .update(AccessScope::Owner(user.id), id, request)
        .await?;
    Ok(Json(updated))
}

/// DELETE /api/templates/{id}
#[tracing::instrument(name = "http.delete_template", skip_all, fields(template_id = %id))]
pub async fn delete_template(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>> {
    state
        .templates
        .delete(AccessScope::Owner(user.id), id)
        .await?;
    Ok(Json(DeletedResponse::new("Template deleted")))
}
