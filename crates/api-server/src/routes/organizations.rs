//! Organizations and their media.

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crm_core::organization::{Organization, OrganizationDraft, OrganizationView};

use super::error::{map_core_error, ApiJson, ApiPath, RouteError};
use super::Removed;
use crate::auth::caller_from_headers;
use crate::state::AppState;
use crate::upload::{LOGO, PICTURES, VIDEOS};

#[derive(Debug, Serialize)]
pub struct MediaResponse {
    pub message: &'static str,
    pub organization: Organization,
}

fn media_response(message: &'static str, organization: Organization) -> Json<MediaResponse> {
    Json(MediaResponse {
        message,
        organization,
    })
}

async fn list_organizations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<OrganizationView>>, RouteError> {
    caller_from_headers(&state, &headers).await?;
    let organizations = state
        .crm()
        .list_organizations()
        .await
        .map_err(map_core_error)?;
    Ok(Json(organizations))
}

async fn create_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(draft): ApiJson<OrganizationDraft>,
) -> Result<(StatusCode, Json<Organization>), RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let organization = state
        .crm()
        .create_organization(&caller, draft)
        .await
        .map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(organization)))
}

async fn get_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<OrganizationView>, RouteError> {
    caller_from_headers(&state, &headers).await?;
    let organization = state
        .crm()
        .get_organization(id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(organization))
}

async fn update_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(draft): ApiJson<OrganizationDraft>,
) -> Result<Json<Organization>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let organization = state
        .crm()
        .update_organization(&caller, id, draft)
        .await
        .map_err(map_core_error)?;
    Ok(Json(organization))
}

async fn delete_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Removed>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    state
        .crm()
        .delete_organization(&caller, id)
        .await
        .map_err(map_core_error)?;
    Ok(Json(Removed::new(id, "Organization removed")))
}

async fn upload_logo(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<MediaResponse>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let upload = LOGO.read_one(multipart).await?;
    let organization = state
        .crm()
        .upload_logo(&caller, id, upload)
        .await
        .map_err(map_core_error)?;
    Ok(media_response("Logo uploaded", organization))
}

async fn upload_pictures(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<MediaResponse>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let uploads = PICTURES.read(multipart).await?;
    let organization = state
        .crm()
        .upload_pictures(&caller, id, uploads)
        .await
        .map_err(map_core_error)?;
    Ok(media_response("Pictures uploaded", organization))
}

async fn delete_picture(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath((id, public_id)): ApiPath<(Uuid, String)>,
) -> Result<Json<MediaResponse>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let organization = state
        .crm()
        .delete_picture(&caller, id, &public_id)
        .await
        .map_err(map_core_error)?;
    Ok(media_response("Picture deleted", organization))
}

async fn upload_videos(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Multipart,
) -> Result<Json<MediaResponse>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let uploads = VIDEOS.read(multipart).await?;
    let organization = state
        .crm()
        .upload_videos(&caller, id, uploads)
        .await
        .map_err(map_core_error)?;
    Ok(media_response("Videos uploaded", organization))
}

async fn delete_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath((id, public_id)): ApiPath<(Uuid, String)>,
) -> Result<Json<MediaResponse>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let organization = state
        .crm()
        .delete_video(&caller, id, &public_id)
        .await
        .map_err(map_core_error)?;
    Ok(media_response("Video deleted", organization))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/organizations",
            get(list_organizations).post(create_organization),
        )
        .route(
            "/api/organizations/{id}",
            get(get_organization)
                .put(update_organization)
                .delete(delete_organization),
        )
        .route(
            "/api/organizations/{id}/logo",
            post(upload_logo).layer(LOGO.body_limit()),
        )
        .route(
            "/api/organizations/{id}/pictures",
            post(upload_pictures).layer(PICTURES.body_limit()),
        )
        .route(
            "/api/organizations/{id}/pictures/{*public_id}",
            delete(delete_picture),
        )
        .route(
            "/api/organizations/{id}/videos",
            post(upload_videos).layer(VIDEOS.body_limit()),
        )
        .route(
            "/api/organizations/{id}/videos/{*public_id}",
            delete(delete_video),
        )
}
