//! Signup and login.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crm_core::user::{SignupInput, User};
use crm_core::Role;

use super::error::{map_core_error, route_error, ApiJson, RouteError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    id: Uuid,
    name: String,
    email: String,
    role: Role,
    token: String,
}

fn auth_response(state: &AppState, user: User) -> Result<AuthResponse, RouteError> {
    let token = state
        .jwt()
        .issue(user.id, user.role)
        .map_err(|err| route_error(StatusCode::INTERNAL_SERVER_ERROR, err))?;
    Ok(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
        token,
    })
}

async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupInput>,
) -> Result<(StatusCode, Json<AuthResponse>), RouteError> {
    let user = state.crm().signup(req).await.map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(auth_response(&state, user)?)))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, RouteError> {
    let user = state
        .crm()
        .login(&req.email, &req.password)
        .await
        .map_err(map_core_error)?;
    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(auth_response(&state, user)?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
}
