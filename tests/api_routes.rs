//! Router-level tests driven through `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use email_trigger_service::server::create_app;
use email_trigger_service::storage::{TemplateStore, UserStore};
use email_trigger_service::user::User;

use common::{insert_user, test_env, RecordingTransport, TestEnv};

fn bearer(env: &TestEnv, user: &User) -> String {
    let token = env.state.sessions.issue(user.id).unwrap();
    format!("Bearer {}", token)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn app(env: &TestEnv) -> Router {
    create_app(env.state.clone())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn authed(method: &str, uri: &str, auth: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, auth);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_health() {
    let env = test_env(RecordingTransport::default());
    let response = app(&env).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let env = test_env(RecordingTransport::default());
    let response = app(&env).oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_me_without_session() {
    let env = test_env(RecordingTransport::default());
    let response = app(&env).oneshot(get("/api/me")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "authenticated": false }));
}

#[tokio::test]
async fn test_protected_route_requires_session() {
    let env = test_env(RecordingTransport::default());
    let response = app(&env).oneshot(get("/api/templates")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_template_crud_over_http() {
    let env = test_env(RecordingTransport::default());
    let user = insert_user(&env.store, "asha@example.com", "Asha", false).await;
    let auth = bearer(&env, &user);

    let response = app(&env)
        .oneshot(authed(
            "POST",
            "/api/templates",
            &auth,
            Some(json!({
                "name": "Leave",
                "category": "leave",
                "subject": "Leave on {{date}}",
                "body": "Reason: {{reason}}",
                "is_default": true
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["variables"], json!(["date", "reason"]));
    assert_eq!(created["is_default"], true);
    let id = created["id"].as_str().unwrap().to_string();

    let response = app(&env)
        .oneshot(authed(
            "PUT",
            &format!("/api/templates/{}", id),
            &auth,
            Some(json!({ "body": "No placeholders here" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["variables"], json!(["date"]));
    assert_eq!(updated["is_default"], true);

    let response = app(&env)
        .oneshot(authed("DELETE", &format!("/api/templates/{}", id), &auth, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(env.store.list_templates(Some(user.id)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_other_users_template_is_not_found() {
    let env = test_env(RecordingTransport::default());
    let asha = insert_user(&env.store, "asha@example.com", "Asha", false).await;
    let ravi = insert_user(&env.store, "ravi@example.com", "Ravi", false).await;
    env.state.templates.seed_for_user(ravi.id).await.unwrap();
    let foreign = env.store.list_templates(Some(ravi.id)).await.unwrap()[0].id;

    let response = app(&env)
        .oneshot(authed(
            "GET",
            &format!("/api/templates/{}", foreign),
            &bearer(&env, &asha),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_with_empty_to_is_rejected() {
    let env = test_env(RecordingTransport::default());
    let user = insert_user(&env.store, "asha@example.com", "Asha", false).await;

    let response = app(&env)
        .oneshot(authed(
            "POST",
            "/api/email/send",
            &bearer(&env, &user),
            Some(json!({ "to": [], "subject": "Hi", "body": "Body" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "NO_RECIPIENTS");
    assert_eq!(env.transport.sent_count(), 0);
}

#[tokio::test]
async fn test_send_and_list_logs() {
    let env = test_env(RecordingTransport::default());
    let user = insert_user(&env.store, "asha@example.com", "Asha", false).await;
    let auth = bearer(&env, &user);

    let response = app(&env)
        .oneshot(authed(
            "POST",
            "/api/email/send",
            &auth,
            Some(json!({
                "to": ["warden@example.com"],
                "subject": "Hello {{who}}",
                "body": "From {{name}}",
                "variables": { "who": "Warden" }
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let sent = body_json(response).await;
    assert_eq!(sent["success"], true);
    assert_eq!(sent["message_id"], "msg-1");

    let response = app(&env)
        .oneshot(authed("GET", "/api/email/logs", &auth, None))
        .await
        .unwrap();
    let logs = body_json(response).await;
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["subject"], "Hello Warden");
    assert_eq!(logs[0]["status"], "sent");
}

#[tokio::test]
async fn test_transport_failure_is_bad_gateway() {
    let env = test_env(RecordingTransport::failing());
    let user = insert_user(&env.store, "asha@example.com", "Asha", false).await;

    let response = app(&env)
        .oneshot(authed(
            "POST",
            "/api/email/send",
            &bearer(&env, &user),
            Some(json!({ "to": ["warden@example.com"], "subject": "S", "body": "B" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"]["code"], "SEND_FAILED");
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let env = test_env(RecordingTransport::default());
    let user = insert_user(&env.store, "asha@example.com", "Asha", false).await;

    let response = app(&env)
        .oneshot(authed("GET", "/api/admin/users", &bearer(&env, &user), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let env = test_env(RecordingTransport::default());
    let admin = insert_user(&env.store, "admin@example.com", "Admin", true).await;

    let response = app(&env)
        .oneshot(authed(
            "DELETE",
            &format!("/api/admin/users/{}", admin.id),
            &bearer(&env, &admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(env.store.get_user(admin.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_admin_bulk_create_template() {
    let env = test_env(RecordingTransport::default());
    let admin = insert_user(&env.store, "admin@example.com", "Admin", true).await;
    insert_user(&env.store, "asha@example.com", "Asha", false).await;

    let response = app(&env)
        .oneshot(authed(
            "POST",
            "/api/admin/templates/bulk-create",
            &bearer(&env, &admin),
            Some(json!({ "name": "Notice", "subject": "Notice", "body": "Hi {{name}}" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["count"], 2);

    let response = app(&env)
        .oneshot(authed(
            "GET",
            "/api/admin/templates",
            &bearer(&env, &admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_admin_lists_all_recipients() {
    let env = test_env(RecordingTransport::default());
    let admin = insert_user(&env.store, "admin@example.com", "Admin", true).await;
    let asha = insert_user(&env.store, "asha@example.com", "Asha", false).await;

    let response = app(&env)
        .oneshot(authed(
            "POST",
            &format!("/api/admin/recipients/user/{}", asha.id),
            &bearer(&env, &admin),
            Some(json!({ "name": "Warden", "email": "warden@example.com", "type": "to" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app(&env)
        .oneshot(authed(
            "GET",
            "/api/admin/recipients",
            &bearer(&env, &admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let recipients = body_json(response).await;
    assert_eq!(recipients.as_array().unwrap().len(), 1);
    assert_eq!(recipients[0]["user_id"], asha.id.to_string());
}

#[tokio::test]
async fn test_login_sets_state_cookie() {
    let env = test_env(RecordingTransport::default());
    let response = app(&env).oneshot(get("/auth/login")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let cookies = set_cookies(&response);
    let state_cookie = cookies
        .iter()
        .find(|c| c.starts_with("oauth_state="))
        .unwrap();
    let state = state_cookie
        .trim_start_matches("oauth_state=")
        .split(';')
        .next()
        .unwrap();

    assert_eq!(state.len(), 32);
    assert!(location.ends_with(&format!("state={}", state)));
}

#[tokio::test]
async fn test_callback_rejects_state_mismatch() {
    let env = test_env(RecordingTransport::default());
    let request = Request::builder()
        .uri("/auth/callback?code=abc&state=forged")
        .header(header::COOKIE, "oauth_state=expected")
        .body(Body::empty())
        .unwrap();

    let response = app(&env).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(env.store.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_callback_rejects_provider_error() {
    let env = test_env(RecordingTransport::default());
    let response = app(&env)
        .oneshot(get("/auth/callback?error=access_denied"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_signs_in_new_user() {
    let env = test_env(RecordingTransport::default());
    let request = Request::builder()
        .uri("/auth/callback?code=abc&state=s3cret")
        .header(header::COOKIE, "oauth_state=s3cret")
        .body(Body::empty())
        .unwrap();

    let response = app(&env).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/dashboard"
    );
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("session=") && !c.starts_with("session=;")));

    let users = env.store.list_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "newcomer@example.com");
    assert!(!users[0].is_admin);
    assert_eq!(users[0].refresh_token.as_deref(), Some("refresh-token"));

    let templates = env.store.list_templates(Some(users[0].id)).await.unwrap();
    assert_eq!(templates.len(), 3);
    assert_eq!(templates.iter().filter(|t| t.is_default).count(), 1);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let env = test_env(RecordingTransport::default());
    let user = insert_user(&env.store, "asha@example.com", "Asha", false).await;
    let token = env.state.sessions.issue(user.id).unwrap();
    let request = Request::builder()
        .uri("/auth/logout")
        .header(header::COOKIE, format!("session={}", token))
        .body(Body::empty())
        .unwrap();

    let response = app(&env).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("session=;") || c.starts_with("session=\"\"")));
}
