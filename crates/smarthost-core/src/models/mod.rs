//! Data models for the application
//!
//! Each sub-module represents one concept of the ingestion pipeline.

mod filename;
mod ingest;
mod response;

pub use filename::CanonicalFilename;
pub use ingest::{IngestRequest, NormalizationOptions, SourceKind, StoredObject};
pub use response::{HomeResponse, IngestResponse};
