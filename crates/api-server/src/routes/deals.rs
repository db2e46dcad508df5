//! Deal CRUD and the pipeline board.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crm_core::deal::{DealDraft, DealFilter, DealPatch, DealView, StageColumn};

use super::error::{map_core_error, ApiJson, ApiPath, ApiQuery, RouteError};
use super::Removed;
use crate::auth::caller_from_headers;
use crate::state::AppState;

async fn list_deals(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiQuery(filter): ApiQuery<DealFilter>,
) -> Result<Json<Vec<DealView>>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let deals = state
        .crm()
        .list_deals(&caller, filter)
        .await
        .map_err(map_core_error)?;
    Ok(Json(deals))
}

async fn create_deal(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(draft): ApiJson<DealDraft>,
) -> Result<(StatusCode, Json<DealView>), RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let deal = state
        .crm()
        .create_deal(&caller, draft)
        .await
        .map_err(map_core_error)?;
    Ok((StatusCode::CREATED, Json(deal)))
}

async fn pipeline_board(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<StageColumn>>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let board = state
        .crm()
        .pipeline_board(&caller)
        .await
        .map_err(map_core_error)?;
    Ok(Json(board))
}

async fn get_deal(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<DealView>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let deal = state.crm().get_deal(&caller, id).await.map_err(map_core_error)?;
    Ok(Json(deal))
}

async fn update_deal(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<DealPatch>,
) -> Result<Json<DealView>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let deal = state
        .crm()
        .update_deal(&caller, id, patch)
        .await
        .map_err(map_core_error)?;
    Ok(Json(deal))
}

async fn delete_deal(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Removed>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    state.crm().delete_deal(&caller, id).await.map_err(map_core_error)?;
    Ok(Json(Removed::new(id, "Deal removed")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/deals", get(list_deals).post(create_deal))
        .route("/api/deals/board", get(pipeline_board))
        .route(
            "/api/deals/{id}",
            get(get_deal).put(update_deal).delete(delete_deal),
        )
}
