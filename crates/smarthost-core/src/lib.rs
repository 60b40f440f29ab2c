//! Smarthost Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every smarthost component: the validator, the normalizer, the object store, the
//! ingestion orchestrator and the HTTP layer.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, IngestConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    CanonicalFilename, HomeResponse, IngestRequest, IngestResponse, NormalizationOptions,
    SourceKind, StoredObject,
};
pub use storage_types::CollisionPolicy;
