//! Contact CRUD and CSV import.

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crm_core::contact::{Contact, ContactDraft, ContactFilter, ContactPatch, ContactView, ImportSummary};

use super::error::{map_core_error, ApiJson, ApiPath, ApiQuery, RouteError};
use super::Removed;
use crate::auth::caller_from_headers;
use crate::state::AppState;
use crate::upload;

#[derive(Debug, Serialize)]
struct ImportResponse {
    message: &'static str,
    #[serde(flatten)]
    summary: ImportSummary,
}

async fn list_contacts(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiQuery(filter): ApiQuery<ContactFilter>,
) -> Result<Json<Vec<ContactView>>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let contacts = state
        .crm()
        .list_contacts(&caller, filter)
        .await
        .map_err(map_core_error)?;
    Ok(Json(contacts))
}

async fn create_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(draft): ApiJson<ContactDraft>,
) -> Result<(StatusCode, Json<Contact>), RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let contact = state
        .crm()
        .create_contact(&caller, draft)
        .await
        .map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn get_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ContactView>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let contact = state
        .crm()
        .get_contact(&caller, id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(contact))
}

async fn update_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ContactPatch>,
) -> Result<Json<Contact>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let contact = state
        .crm()
        .update_contact(&caller, id, patch)
        .await
        .map_err(map_core_error)?;
    Ok(Json(contact))
}

async fn delete_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Removed>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    state
        .crm()
        .delete_contact(&caller, id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(Removed::new(id, "Contact removed")))
}

async fn import_contacts(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ImportResponse>), RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let file = upload::CSV_IMPORT.read_one(multipart).await?;
    let summary = state
        .crm()
        .import_contacts(&caller, &file.bytes)
        .await
        .map_err(map_core_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            message: "Import process completed.",
            summary,
        }),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/contacts", get(list_contacts).post(create_contact))
        .route(
            "/api/contacts/import",
            post(import_contacts).layer(upload::CSV_IMPORT.body_limit()),
        )
        .route(
            "/api/contacts/{id}",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}
