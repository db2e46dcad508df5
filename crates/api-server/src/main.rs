//! CRM API server
//!
//! Serves the REST API and the locally stored media files.

mod auth;
mod config;
mod mailer;
mod routes;
mod state;
mod upload;

use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crm_core::email::Mailer;
use crm_core::media::LocalMediaStore;
use crm_core::Crm;

use crate::auth::JwtKeys;
use crate::config::ServerConfig;
use crate::mailer::{LogMailer, SmtpMailer};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crm_server=debug,crm_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    if config.uses_dev_secret() {
        tracing::warn!("CRM_JWT_SECRET is not set, using the development secret");
    }
    tracing::info!(data_dir = ?config.data_dir, media_dir = ?config.media_dir, "using data directories");

    let media = Arc::new(LocalMediaStore::new(
        config.media_dir.clone(),
        config.media_base_url.clone(),
    ));
    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "smtp mailer configured");
            Arc::new(SmtpMailer::new(smtp).context("invalid SMTP configuration")?)
        }
        None => {
            tracing::warn!("SMTP_HOST is not set, outgoing email will only be logged");
            Arc::new(LogMailer)
        }
    };

    let crm = Crm::open(config.data_dir.clone(), media, mailer)
        .await
        .context("failed to open data directory")?;

    if let Some(admin) = &config.admin {
        let created = crm
            .ensure_admin(&admin.email, &admin.password, &admin.name)
            .await
            .context("failed to create bootstrap admin")?;
        if created {
            tracing::info!(email = %admin.email, "bootstrap admin account created");
        }
    }

    let state = AppState::new(crm, JwtKeys::new(&config.jwt_secret, config.token_ttl_seconds));

    let app = routes::api_router()
        .with_state(state)
        .nest_service("/uploads", ServeDir::new(&config.media_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("CRM API listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
