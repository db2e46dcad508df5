//! Application state

use std::sync::Arc;

use crm_core::Crm;

use crate::auth::JwtKeys;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    crm: Crm,
    jwt: JwtKeys,
}

impl AppState {
    pub fn new(crm: Crm, jwt: JwtKeys) -> Self {
        Self {
            inner: Arc::new(AppStateInner { crm, jwt }),
        }
    }

    /// Business operations
    pub fn crm(&self) -> &Crm {
        &self.inner.crm
    }

    pub fn jwt(&self) -> &JwtKeys {
        &self.inner.jwt
    }
}
