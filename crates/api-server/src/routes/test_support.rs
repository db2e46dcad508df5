//! Helpers for router tests.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crm_core::media::LocalMediaStore;
use crm_core::user::SignupInput;
use crm_core::{Caller, Crm, Role};

use crate::auth::JwtKeys;
use crate::mailer::LogMailer;
use crate::state::AppState;

pub async fn build_app() -> (Router, AppState, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let media = Arc::new(LocalMediaStore::new(temp_dir.path().join("media"), "/uploads"));
    let crm = Crm::open(temp_dir.path().join("data"), media, Arc::new(LogMailer))
        .await
        .unwrap();
    let state = AppState::new(crm, JwtKeys::new("test-secret", 3600));
    (super::api_router().with_state(state.clone()), state, temp_dir)
}

/// Sign up `name` (`<name>@example.com`, password `password123`) and
/// return the caller plus a bearer token.
pub async fn seed_user(state: &AppState, name: &str) -> (Caller, String) {
    let user = state
        .crm()
        .signup(SignupInput {
            name: Some(name.to_string()),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            password: Some("password123".to_string()),
        })
        .await
        .unwrap();
    let token = state.jwt().issue(user.id, user.role).unwrap();
    (user.caller(), token)
}

pub async fn seed_admin(state: &AppState) -> Caller {
    seed_admin_with_token(state).await.0
}

pub async fn seed_admin_with_token(state: &AppState) -> (Caller, String) {
    state
        .crm()
        .ensure_admin("root@example.com", "password123", "Root")
        .await
        .unwrap();
    let user = state.crm().login("root@example.com", "password123").await.unwrap();
    assert_eq!(user.role, Role::Admin);
    let token = state.jwt().issue(user.id, user.role).unwrap();
    (user.caller(), token)
}

fn with_auth(
    builder: axum::http::request::Builder,
    token: Option<&str>,
) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
        None => builder,
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    with_auth(Request::builder().method(method).uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    with_auth(Request::builder().method(method).uri(uri), token)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A multipart body with one file part per entry of `files`:
/// `(field, file name, content type, bytes)`.
pub fn multipart_request(
    uri: &str,
    token: Option<&str>,
    files: &[(&str, &str, &str, &[u8])],
) -> Request<Body> {
    let boundary = "crm-test-boundary";
    let mut body = Vec::new();
    for (field, file_name, content_type, bytes) in files {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    with_auth(Request::builder().method("POST").uri(uri), token)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}
