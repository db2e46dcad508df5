//! Sending email to a contact.

use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crm_core::activity::Activity;

use super::error::{map_core_error, ApiJson, ApiPath, RouteError};
use crate::auth::caller_from_headers;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct SendEmailRequest {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendEmailResponse {
    message: &'static str,
    activity: Activity,
}

async fn send_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiPath(contact_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, RouteError> {
    let caller = caller_from_headers(&state, &headers).await?;
    let activity = state
        .crm()
        .send_contact_email(&caller, contact_id, req.subject, req.body)
        .await
        .map_err(map_core_error)?;
    Ok(Json(SendEmailResponse {
        message: "Email sent and logged successfully.",
        activity,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/contacts/{contact_id}/email", post(send_email))
}
