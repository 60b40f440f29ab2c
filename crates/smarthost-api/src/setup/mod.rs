//! Application setup and initialization
//!
//! `initialize_app` is what the binary runs; `build_app` skips telemetry so tests can
//! build a router per case against their own storage root.

pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use smarthost_core::Config;
use smarthost_services::{FilenameValidator, IngestionService, RemoteFetcher};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    tracing::info!("Configuration loaded and validated successfully");

    build_app(config).await
}

/// Build state and router without touching global tracing state.
pub async fn build_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let storage = storage::setup_storage(&config).await?;

    let fetcher = RemoteFetcher::from_config(&config).context("Failed to build fetch client")?;
    let validator = FilenameValidator::from_config(&config);
    let ingestion = IngestionService::new(validator, fetcher, storage);

    let state = Arc::new(AppState::new(config.clone(), ingestion));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
