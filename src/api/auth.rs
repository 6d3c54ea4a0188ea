//! Sign-in endpoints: consent redirect, OAuth callback, logout and `/api/me`.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{authenticate, OAuthError, OAUTH_STATE_COOKIE};
use crate::error::Result;
use crate::server::AppState;

/// Where the browser lands after a successful sign-in
const POST_LOGIN_REDIRECT: &str = "/dashboard";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

/// GET /auth/login - Redirect to the provider's consent screen
#[tracing::instrument(name = "http.login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let (url, oauth_state) = state.sign_in.begin()?;
    let jar = jar.add(state.sessions.state_cookie(oauth_state));
    Ok((jar, Redirect::to(&url)))
}

/// GET /auth/callback - Complete sign-in and set the session cookie
#[tracing::instrument(name = "http.oauth_callback", skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    if let Some(error) = params.error {
        return Err(OAuthError::Provider(error).into());
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(OAuthError::MissingCode)?;

    let expected = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    match (params.state, expected) {
        (Some(received), Some(expected)) if !expected.is_empty() && received == expected => {}
        _ => return Err(OAuthError::StateMismatch.into()),
    }

    let sign_in = state.sign_in.complete(&code).await?;
    let token = state.sessions.issue(sign_in.user.id)?;

    let jar = jar
        .remove(state.sessions.state_removal_cookie())
        .add(state.sessions.session_cookie(token));

    Ok((jar, Redirect::to(POST_LOGIN_REDIRECT)))
}

/// GET /auth/logout - Clear the session cookie
#[tracing::instrument(name = "http.logout", skip_all)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(state.sessions.removal_cookie()), Redirect::to("/"))
}

/// GET /api/me - The signed-in user, or `authenticated: false`
#[tracing::instrument(name = "http.me", skip_all)]
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Json<MeResponse> {
    match authenticate(&state, &headers).await {
        Ok(user) => Json(MeResponse {
            authenticated: true,
            id: Some(user.id),
            email: Some(user.email),
            name: Some(user.name),
            is_admin: Some(user.is_admin),
        }),
        Err(_) => Json(MeResponse {
            authenticated: false,
            id: None,
            email: None,
            name: None,
            is_admin: None,
        }),
    }
}
