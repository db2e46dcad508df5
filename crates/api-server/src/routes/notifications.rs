//! The caller's notification inbox.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crm_core::notification::Notification;

use super::error::{map_core_error, RouteError};
use crate::auth::caller_from_headers;
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct MarkReadResponse {
    message: &'static str,
    updated: usize,
}

async fn list_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Notification>>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let notifications = state
        .crm()
        .list_notifications(&caller)
        .await
        .map_err(map_core_error)?;
    Ok(Json(notifications))
}

async fn mark_all_read(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MarkReadResponse>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let updated = state
        .crm()
        .mark_all_read(&caller)
        .await
        .map_err(map_core_error)?;
    Ok(Json(MarkReadResponse {
        message: "Notifications marked as read",
        updated,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/read", post(mark_all_read))
}
