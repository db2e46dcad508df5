//! Route handlers

pub mod activities;
pub mod auth;
pub mod contacts;
pub mod deals;
pub mod email;
pub mod error;
pub mod files;
pub mod health;
pub mod notes;
pub mod notifications;
pub mod organizations;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

use axum::Router;
use serde::Serialize;
use uuid::Uuid;

use crate::state::AppState;

/// Body returned after a record is deleted.
#[derive(Debug, Serialize)]
pub struct Removed {
    pub id: Uuid,
    pub message: String,
}

impl Removed {
    pub fn new(id: Uuid, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
        }
    }
}

/// Every API route, without middleware or state.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(contacts::router())
        .merge(notes::router())
        .merge(activities::router())
        .merge(email::router())
        .merge(files::router())
        .merge(organizations::router())
        .merge(deals::router())
        .merge(notifications::router())
}
