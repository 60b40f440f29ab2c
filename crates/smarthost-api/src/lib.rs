//! Smarthost API Library
//!
//! This crate provides the HTTP handlers, error rendering and application setup for
//! the ingestion service. Handlers stay thin: they translate HTTP into calls on
//! `smarthost_services::IngestionService` and render the result.

// Module declarations
mod api_doc;
mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod constants;
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
