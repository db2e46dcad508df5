//! Bearer-token authentication.

mod jwt;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use uuid::Uuid;

use crm_core::Caller;

pub use jwt::JwtKeys;

use crate::routes::error::{map_core_error, unauthorized, RouteError};
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the request's caller: verify the token, then load the account it
/// names. Deactivated accounts are rejected on every request.
pub async fn caller_from_headers(state: &AppState, headers: &HeaderMap) -> Result<Caller, RouteError> {
    let token = bearer_token(headers).ok_or_else(|| unauthorized("Not authorized, no token"))?;

    let claims = state.jwt().verify(token).map_err(|err| {
        tracing::debug!(error = %err, "bearer token rejected");
        unauthorized("Not authorized, token failed")
    })?;
    let user_id =
        Uuid::parse_str(&claims.sub).map_err(|_| unauthorized("Not authorized, token failed"))?;

    state
        .crm()
        .resolve_caller(user_id)
        .await
        .map_err(map_core_error)
}
