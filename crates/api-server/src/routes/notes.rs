//! Notes on a contact.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crm_core::note::{Note, NoteDraft};

use super::error::{map_core_error, ApiJson, ApiPath, RouteError};
use crate::auth::caller_from_headers;
use crate::state::AppState;

async fn list_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(contact_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Note>>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let notes = state
        .crm()
        .list_notes(&caller, contact_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(notes))
}

async fn create_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(contact_id): ApiPath<Uuid>,
    ApiJson(draft): ApiJson<NoteDraft>,
) -> Result<(StatusCode, Json<Note>), RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let note = state
        .crm()
        .create_note(&caller, contact_id, draft)
        .await
        .map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/contacts/{contact_id}/notes",
        get(list_notes).post(create_note),
    )
}
