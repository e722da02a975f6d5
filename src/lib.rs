use std::path::Path;

use crate::auth::{IdentityVerifier, JwtVerifier};
use crate::model::{DbConnection, ModelManager, PgUserStore, UserStore};
use crate::utils::signal::shutdown_signal;
use crate::{error::AppResult, web::AppState};
use axum::Router;
use tokio::net::TcpListener;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod error;
pub mod model;
pub mod utils;
pub mod web;

static APPLICATION_NAME: &str = "lesson-ledger";

/// Production wiring: Postgres store, migrations applied, JWT verifier from
/// the `[auth]` section.
pub async fn build_server(config: Config) -> AppResult<(AppState, Router)> {
    let db = DbConnection::connect(config.app().database_uri())?;
    db.migrate(Path::new("./migrations")).await?;

    let verifier = JwtVerifier::from_config(config.auth())?;
    Ok(build_server_with_store(config, PgUserStore::new(db), verifier))
}

pub fn build_server_with_store<S, V>(config: Config, store: S, verifier: V) -> (AppState, Router)
where
    S: UserStore + 'static,
    V: IdentityVerifier + 'static,
{
    let mm = ModelManager::new(store);
    let state = AppState::new(mm, verifier, config);
    let app = web::routes::build_app(state.clone());
    (state, app)
}

#[tracing::instrument(skip(config))]
pub async fn setup_workers(config: Config) -> AppResult<()> {
    let bindto = config.host().bindto().to_string();
    let (_, app) = build_server(config).await?;
    let listener = TcpListener::bind(&bindto).await?;

    tracing::info!("axum is starting at: {}", bindto);
    let axum_handle = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal());

    axum_handle.await?;
    Ok(())
}

fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    let config = Config::load(cfg!(debug_assertions))?;
    setup_workers(config).await?;
    Ok(())
}
