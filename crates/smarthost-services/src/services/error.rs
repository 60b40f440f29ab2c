//! Ingestion error aggregate and its mapping onto `AppError`

use crate::services::fetch::FetchError;
use crate::services::upload::ReadError;
use smarthost_core::AppError;
use smarthost_processing::{NormalizeError, ValidationError};
use smarthost_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Read(#[from] ReadError),

    /// The source bytes could not be decoded as an image.
    #[error("{0}")]
    Decode(String),

    /// Decoded, but the normalized image cannot be written as JPEG.
    #[error("{0}")]
    Encode(String),

    #[error("File not found: {0}")]
    NotFound(String),

    /// Only raised under the reject collision policy.
    #[error("File already exists: {0}")]
    Conflict(String),

    #[error("Failed to persist object: {0}")]
    Write(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<NormalizeError> for IngestError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Decode(msg) => IngestError::Decode(format!("Failed to decode image: {}", msg)),
            NormalizeError::Encode(msg) => IngestError::Encode(format!("Failed to encode image: {}", msg)),
        }
    }
}

impl From<StorageError> for IngestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => IngestError::NotFound(name),
            StorageError::AlreadyExists(name) => IngestError::Conflict(name),
            other => IngestError::Write(other.to_string()),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Validation(e @ ValidationError::InvalidFilename(_)) => {
                AppError::InvalidInput(e.to_string())
            }
            IngestError::Validation(_) => AppError::InvalidInput("Invalid file type".to_string()),
            IngestError::Fetch(FetchError::Status { .. }) => {
                AppError::FetchFailed("Failed to fetch image from URL".to_string())
            }
            IngestError::Fetch(FetchError::InvalidUrl(msg)) => AppError::InvalidInput(msg),
            IngestError::Fetch(e @ FetchError::TooLarge { .. }) => AppError::PayloadTooLarge(e.to_string()),
            IngestError::Fetch(e @ (FetchError::Network(_) | FetchError::Timeout(_))) => {
                AppError::FetchUnavailable(e.to_string())
            }
            IngestError::Fetch(e @ FetchError::Client(_)) => AppError::Internal(e.to_string()),
            IngestError::Read(e @ ReadError::TooLarge { .. }) => AppError::PayloadTooLarge(e.to_string()),
            IngestError::Read(e @ ReadError::Interrupted(_)) => AppError::BadRequest(e.to_string()),
            IngestError::Decode(msg) | IngestError::Encode(msg) => AppError::ImageProcessing(msg),
            IngestError::NotFound(_) => AppError::NotFound("File not found".to_string()),
            IngestError::Conflict(name) => {
                AppError::Conflict(format!("A file named {} already exists", name))
            }
            IngestError::Write(msg) => AppError::Storage(msg),
            IngestError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
