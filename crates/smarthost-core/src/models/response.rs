use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::UPLOAD_SUCCESS_MESSAGE;

/// Body returned by both ingestion routes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestResponse {
    pub message: String,
    pub filename: String,
}

impl IngestResponse {
    pub fn uploaded(filename: impl Into<String>) -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            filename: filename.into(),
        }
    }
}

/// Liveness probe body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HomeResponse {
    pub message: String,
}
