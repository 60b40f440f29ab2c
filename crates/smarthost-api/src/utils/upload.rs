//! Multipart extraction for the upload route

use crate::constants::UPLOAD_FIELD_NAME;
use axum::extract::Multipart;
use bytes::Bytes;
use smarthost_core::AppError;
use smarthost_services::{read_upload, IngestError};

/// A file pulled out of a multipart body.
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// Extract the single field named "file" from a multipart form.
///
/// The field is read chunk by chunk and capped at `max_size`. Other fields are skipped;
/// a second "file" field is rejected.
pub async fn extract_multipart_file(
    mut multipart: Multipart,
    max_size: usize,
) -> Result<UploadedFile, AppError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();
        if field_name != UPLOAD_FIELD_NAME {
            continue;
        }

        if file.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let filename = field.file_name().map(|s| s.to_string()).unwrap_or_default();
        let data = read_upload(field, max_size)
            .await
            .map_err(|e| AppError::from(IngestError::from(e)))?;

        file = Some(UploadedFile { filename, data });
    }

    file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))
}
