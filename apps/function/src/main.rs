//! PPE inspection function composition root.

#![forbid(unsafe_code)]

mod dto;
mod error;
mod function_config;
mod function_services;
mod handlers;
mod state;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{get, post};
use ppecheck_core::AppError;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::function_config::FunctionConfig;
use crate::function_services::build_inspection_service;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = FunctionConfig::load()?;
    let inspection_service = build_inspection_service(&config).await?;
    info!(
        scratch_root = %config.inspection.scratch_root.display(),
        "inspection service ready"
    );

    let app = Router::new()
        .route("/", post(handlers::inspect_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(AppState { inspection_service })
        .layer(TraceLayer::new_for_http());

    let address = SocketAddr::from((config.host, config.port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "ppecheck-function listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("function server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
