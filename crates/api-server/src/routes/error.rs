//! Error responses shared by every route.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::{request::Parts, StatusCode},
    Json,
};
use serde::Serialize;

use crm_core::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub type RouteError = (StatusCode, Json<ErrorResponse>);

pub fn route_error(status: StatusCode, message: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
            error: None,
        }),
    )
}

pub fn bad_request(message: impl Into<String>) -> RouteError {
    route_error(StatusCode::BAD_REQUEST, message)
}

pub fn unauthorized(message: impl Into<String>) -> RouteError {
    route_error(StatusCode::UNAUTHORIZED, message)
}

fn internal_error(error: &Error) -> RouteError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            message: "Server Error".to_string(),
            error: Some(error.to_string()),
        }),
    )
}

/// Map a core error onto a status code. Records that exist but belong to
/// someone else are reported exactly like missing ones.
pub fn map_core_error(error: Error) -> RouteError {
    match &error {
        Error::Validation(_) | Error::Duplicate(_) => bad_request(error.to_string()),
        Error::Unauthenticated(_) => unauthorized(error.to_string()),
        Error::AccountDisabled | Error::Forbidden(_) => {
            route_error(StatusCode::FORBIDDEN, error.to_string())
        }
        Error::NotFound(_) | Error::NotAuthorized(_) => {
            route_error(StatusCode::NOT_FOUND, error.to_string())
        }
        _ => {
            tracing::error!(error = %error, "request failed");
            internal_error(&error)
        }
    }
}

/// `Json` extractor whose rejections are reported as 400 in the common
/// error shape.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = RouteError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(bad_request(rejection.body_text())),
        }
    }
}

/// `Path` extractor with 400 rejections in the common error shape.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = RouteError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(bad_request(rejection.body_text())),
        }
    }
}

/// `Query` extractor with 400 rejections in the common error shape.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = RouteError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(bad_request(rejection.body_text())),
        }
    }
}
