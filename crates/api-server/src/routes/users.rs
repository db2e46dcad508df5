//! User administration and the caller's own profile.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crm_core::user::{NewUserInput, UserListing, UserProfile};

use super::error::{map_core_error, ApiJson, ApiPath, RouteError};
use crate::auth::caller_from_headers;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct RoleRequest {
    #[serde(default)]
    role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusRequest {
    is_active: bool,
}

#[derive(Debug, Deserialize)]
struct ProfileRequest {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest {
    #[serde(default)]
    current_password: String,
    #[serde(default)]
    new_password: String,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserListing>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let users = state.crm().list_users(&caller).await.map_err(map_core_error)?;
    Ok(Json(users))
}

async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(input): ApiJson<NewUserInput>,
) -> Result<(StatusCode, Json<UserProfile>), RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let user = state
        .crm()
        .create_user(&caller, input)
        .await
        .map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<RoleRequest>,
) -> Result<Json<UserProfile>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let user = state
        .crm()
        .update_role(&caller, id, &req.role)
        .await
        .map_err(map_core_error)?;
    Ok(Json(user))
}

async fn set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> Result<Json<UserProfile>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let user = state
        .crm()
        .set_status(&caller, id, req.is_active)
        .await
        .map_err(map_core_error)?;
    Ok(Json(user))
}

async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let profile = state.crm().get_profile(&caller).await.map_err(map_core_error)?;
    Ok(Json(profile))
}

async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> Result<Json<UserProfile>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let profile = state
        .crm()
        .update_profile(&caller, req.name)
        .await
        .map_err(map_core_error)?;
    Ok(Json(profile))
}

async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<PasswordRequest>,
) -> Result<Json<MessageResponse>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    state
        .crm()
        .change_password(&caller, &req.current_password, &req.new_password)
        .await
        .map_err(map_core_error)?;
    Ok(Json(MessageResponse {
        message: "Password updated successfully.",
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/profile", get(get_profile).put(update_profile))
        .route("/api/users/profile/password", put(change_password))
        .route("/api/users/{id}/role", put(update_role))
        .route("/api/users/{id}/status", put(set_status))
}
