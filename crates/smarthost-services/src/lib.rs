//! Smarthost Services Layer
//!
//! This crate is the ingestion service layer: it acquires source bytes (remote fetch or
//! buffered upload), decides how they are normalized, and drives them into the object
//! store. It also re-exports the processing and storage types the HTTP crate needs, so
//! that crate depends on a single service facade.

pub mod services;

pub use services::error::IngestError;
pub use services::fetch::{FetchError, RemoteFetcher};
pub use services::ingestion::{IngestOutcome, IngestionService};
pub use services::plan::NormalizationPlan;
pub use services::upload::{read_upload, ReadError};

pub use smarthost_processing::{
    sanitize_filename, FilenameValidator, ImageNormalizer, NormalizeError, StemStrategy,
    UrlQueryValueAsStem, ValidationError,
};
pub use smarthost_storage::{LocalStorage, ObjectStream, Storage, StorageError, StorageResult};
