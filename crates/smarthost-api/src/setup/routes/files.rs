//! Ingestion and retrieval routes.

use crate::constants::{API_PREFIX, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use smarthost_core::Config;
use std::sync::Arc;

pub fn file_routes(config: &Config) -> Router<Arc<AppState>> {
    // The handler enforces the exact file limit; this only has to let a full-size file through.
    let upload_body_limit = config.max_upload_size_bytes() + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route(
            &format!("{}/files/index", API_PREFIX),
            post(handlers::files::ingest_from_url),
        )
        .route(
            &format!("{}/files/upload", API_PREFIX),
            post(handlers::files::upload_file).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route(
            &format!("{}/files/{{filename}}", API_PREFIX),
            get(handlers::files::get_file),
        )
}
