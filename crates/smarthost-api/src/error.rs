//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that converts into
//! `AppError` (including `IngestError`) becomes an `HttpAppError` via `?` and renders with
//! the same status, body and logging.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use smarthost_core::{AppError, ErrorMetadata, LogLevel};
use smarthost_services::IngestError;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rule: IntoResponse and AppError are both foreign here)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<IngestError> for HttpAppError {
    fn from(err: IngestError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl HttpAppError {
    fn to_error_response(&self, hide_details: bool) -> ErrorResponse {
        let app_error = &self.0;
        let hide_details = hide_details || app_error.is_sensitive();

        ErrorResponse {
            error: app_error.client_message(),
            details: (!hide_details).then(|| app_error.detailed_message()),
            error_type: (!hide_details).then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        // Always hide details in production; elsewhere only for sensitive errors.
        let body = self.to_error_response(is_production_env());

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smarthost_services::{FetchError, StorageError, ValidationError};

    #[test]
    fn test_from_ingest_error_validation() {
        let err: IngestError = ValidationError::MissingExtension("README".to_string()).into();
        let HttpAppError(app_err) = err.into();
        match app_err {
            AppError::InvalidInput(msg) => assert_eq!(msg, "Invalid file type"),
            _ => panic!("Expected InvalidInput variant"),
        }
    }

    #[test]
    fn test_from_ingest_error_not_found() {
        let err: IngestError = StorageError::NotFound("a.png".to_string()).into();
        let HttpAppError(app_err) = err.into();
        assert!(matches!(app_err, AppError::NotFound(_)));
    }

    #[test]
    fn test_from_ingest_error_fetch_timeout() {
        let err: IngestError = FetchError::Timeout(60).into();
        let HttpAppError(app_err) = err.into();
        assert!(matches!(app_err, AppError::FetchUnavailable(_)));
        assert_eq!(app_err.http_status_code(), 500);
    }

    #[test]
    fn test_sensitive_errors_hide_details() {
        let err = HttpAppError(AppError::Storage("/srv/uploads: disk full".to_string()));
        let body = err.to_error_response(false);
        assert_eq!(body.error, "Failed to access storage");
        assert!(body.details.is_none());
        assert!(body.error_type.is_none());
        assert!(body.recoverable);
    }

    #[test]
    fn test_production_hides_details() {
        let err = HttpAppError(AppError::NotFound("File not found".to_string()));
        assert!(err.to_error_response(false).details.is_some());
        assert!(err.to_error_response(true).details.is_none());
    }

    /// Serialized ErrorResponse always has "error", "code" and "recoverable".
    #[test]
    fn test_error_response_shape() {
        let err = HttpAppError(AppError::InvalidInput("Invalid file type".to_string()));
        let json = serde_json::to_value(err.to_error_response(true)).expect("serialize");
        assert_eq!(json.get("error").and_then(|v| v.as_str()), Some("Invalid file type"));
        assert_eq!(json.get("code").and_then(|v| v.as_str()), Some("INVALID_INPUT"));
        assert_eq!(json.get("recoverable").and_then(|v| v.as_bool()), Some(false));
        assert!(json.get("details").is_none());
    }
}
