//! OpenAPI documentation served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use smarthost_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Smarthost API",
        version = "0.1.0",
        description = "Media ingestion service: fetch by URL or upload, optional image normalization, flat local storage, retrieval by name."
    ),
    paths(
        handlers::home::get_home,
        handlers::files::ingest_from_url,
        handlers::files::upload_file,
        handlers::files::get_file,
    ),
    components(schemas(
        handlers::files::IndexRequest,
        models::IngestResponse,
        models::HomeResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "files", description = "Ingestion and retrieval"),
        (name = "health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;
