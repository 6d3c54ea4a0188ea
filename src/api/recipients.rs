//! Recipient endpoints for the signed-in user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::Result;
use crate::recipient::{
    CreateRecipientRequest, DefaultRecipientsResponse, Recipient, UpdateRecipientRequest,
};
use crate::server::AppState;
use crate::user::AccessScope;

use super::DeletedResponse;

#[tracing::instrument(name = "http.list_recipients", skip_all, fields(user_id = %user.id))]
pub async fn list_recipients(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Recipient>>> {
    let recipients = state.recipients.list(AccessScope::Owner(user.id)).await?;
    Ok(Json(recipients))
}

/// GET /api/recipients/defaults - `{to: [...], cc: [...]}`
#[tracing::instrument(name = "http.default_recipients", skip_all, fields(user_id = %user.id))]
pub async fn default_recipients(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DefaultRecipientsResponse>> {
    Ok(Json(state.recipients.defaults(user.id).await?))
}

#[tracing::instrument(name = "http.get_recipient", skip_all, fields(recipient_id = %id))]
pub async fn get_recipient(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Recipient>> {
    let recipient = state.recipients.get(AccessScope::Owner(user.id), id).await?;
    Ok(Json(recipient))
}

#[tracing::instrument(name = "http.create_recipient", skip_all, fields(user_id = %user.id))]
pub async fn create_recipient(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateRecipientRequest>,
) -> Result<(StatusCode, Json<Recipient>)> {
    let created = state.recipients.create(user.id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(name = "http.update_recipient", skip_all, fields(recipient_id = %id))]
pub async fn update_recipient(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRecipientRequest>,
) -> Result<Json<Recipient>> {
    let updated = state
        .recipients
        .update(AccessScope::Owner(user.id), id, request)
        .await?;
    Ok(Json(updated))
}

#[tracing::instrument(name = "http.delete_recipient", skip_all, fields(recipient_id = %id))]
pub async fn delete_recipient(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>> {
    state
        .recipients
        .delete(AccessScope::Owner(user.id), id)
        .await?;
    Ok(Json(DeletedResponse::new("Recipient deleted")))
}
