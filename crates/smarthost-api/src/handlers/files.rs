//! Ingestion and retrieval handlers.

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::content_type::content_type_for;
use crate::utils::upload::extract_multipart_file;
use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Deserialize;
use smarthost_core::{AppError, IngestRequest, IngestResponse};
use std::sync::Arc;
use utoipa::ToSchema;

fn default_url_compress() -> bool {
    true
}

/// Body of `POST /api/files/index`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IndexRequest {
    pub url: String,
    /// Resize to the fixed canvas. The fetched image is re-encoded as JPEG either way.
    #[serde(default = "default_url_compress")]
    pub compress: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub compress: bool,
}

/// Fetch a remote image and store it.
#[utoipa::path(
    post,
    path = "/api/files/index",
    tag = "files",
    request_body = IndexRequest,
    responses(
        (status = 200, description = "File uploaded successfully", body = IngestResponse),
        (status = 400, description = "Remote returned non-success status, or body is not an image", body = ErrorResponse),
        (status = 413, description = "Remote body too large", body = ErrorResponse),
        (status = 500, description = "Network error or timeout while fetching", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(url = %request.url, compress = request.compress, operation = "ingest_from_url"))]
pub async fn ingest_from_url(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<IndexRequest>,
) -> Result<Json<IngestResponse>, HttpAppError> {
    let url = request.url.trim();
    if url.is_empty() {
        return Err(HttpAppError::from(AppError::InvalidInput(
            "URL is required".to_string(),
        )));
    }

    let outcome = state
        .ingestion
        .ingest(IngestRequest::FromUrl {
            url: url.to_string(),
            compress: request.compress,
        })
        .await?;

    Ok(Json(IngestResponse::uploaded(outcome.filename.into_string())))
}

/// Store a file sent as multipart field `file`.
#[utoipa::path(
    post,
    path = "/api/files/upload",
    tag = "files",
    params(
        ("compress" = Option<bool>, Query, description = "Normalize image uploads to a 640x640 JPEG (default false)")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded successfully", body = IngestResponse),
        (status = 400, description = "Invalid file type or undecodable image", body = ErrorResponse),
        (status = 409, description = "Name already taken (reject collision policy only)", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(compress = query.compress, operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<Json<IngestResponse>, HttpAppError> {
    let file = extract_multipart_file(multipart, state.config.max_upload_size_bytes()).await?;

    tracing::debug!(
        declared_filename = %file.filename,
        size_bytes = file.data.len(),
        "Upload received"
    );

    let outcome = state
        .ingestion
        .ingest(IngestRequest::FromUpload {
            raw_bytes: file.data,
            declared_filename: file.filename,
            compress: query.compress,
        })
        .await?;

    Ok(Json(IngestResponse::uploaded(outcome.filename.into_string())))
}

/// Stream a stored file's bytes.
#[utoipa::path(
    get,
    path = "/api/files/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Name returned at upload time")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "get_file"))]
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    let object = state.ingestion.retrieve(&filename).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(object.filename.as_str()))
        .header(header::CONTENT_LENGTH, object.size_bytes)
        .body(Body::from_stream(object.body))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
