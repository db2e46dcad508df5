//! File attachments on contacts and organizations.

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crm_core::file::FileRecord;

use super::error::{map_core_error, ApiPath, RouteError};
use crate::auth::caller_from_headers;
use crate::state::AppState;
use crate::upload::ATTACHMENT;

#[derive(Debug, Serialize)]
pub struct FileDeleted {
    pub message: &'static str,
    pub id: Uuid,
}

impl FileDeleted {
    fn new(id: Uuid) -> Self {
        Self {
            message: "File deleted",
            id,
        }
    }
}

async fn list_contact_files(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(contact_id): ApiPath<Uuid>,
) -> Result<Json<Vec<FileRecord>>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let files = state
        .crm()
        .list_contact_files(&caller, contact_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(files))
}

async fn upload_contact_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(contact_id): ApiPath<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<FileRecord>), RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let upload = ATTACHMENT.read_one(multipart).await?;
    let file = state
        .crm()
        .upload_contact_file(&caller, contact_id, upload)
        .await
        .map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(file)))
}

async fn delete_contact_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath((contact_id, file_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<FileDeleted>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    state
        .crm()
        .delete_contact_file(&caller, contact_id, file_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(FileDeleted::new(file_id)))
}

async fn list_organization_files(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(organization_id): ApiPath<Uuid>,
) -> Result<Json<Vec<FileRecord>>, RouteError> {
    caller_from_headers(&state, &headers).await?;
    let files = state
        .crm()
        .list_organization_files(organization_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(files))
}

async fn upload_organization_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(organization_id): ApiPath<Uuid>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<FileRecord>), RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let upload = ATTACHMENT.read_one(multipart).await?;
    let file = state
        .crm()
        .upload_organization_file(&caller, organization_id, upload)
        .await
        .map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(file)))
}

async fn delete_organization_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath((organization_id, file_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<FileDeleted>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    state
        .crm()
        .delete_organization_file(&caller, organization_id, file_id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(FileDeleted::new(file_id)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/contacts/{contact_id}/files",
            get(list_contact_files)
                .post(upload_contact_file)
                .layer(ATTACHMENT.body_limit()),
        )
        .route(
            "/api/contacts/{contact_id}/files/{file_id}",
            delete(delete_contact_file),
        )
        .route(
            "/api/organizations/{organization_id}/files",
            get(list_organization_files)
                .post(upload_organization_file)
                .layer(ATTACHMENT.body_limit()),
        )
        .route(
            "/api/organizations/{organization_id}/files/{file_id}",
            delete(delete_organization_file),
        )
}
