use bytes::Bytes;

use super::CanonicalFilename;

/// Where the bytes of an ingestion come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Url,
    Upload,
}

/// One ingestion request. Immutable once constructed.
#[derive(Debug, Clone)]
pub enum IngestRequest {
    FromUrl {
        url: String,
        compress: bool,
    },
    FromUpload {
        raw_bytes: Bytes,
        declared_filename: String,
        compress: bool,
    },
}

impl IngestRequest {
    pub fn source_kind(&self) -> SourceKind {
        match self {
            IngestRequest::FromUrl { .. } => SourceKind::Url,
            IngestRequest::FromUpload { .. } => SourceKind::Upload,
        }
    }

    pub fn options(&self) -> NormalizationOptions {
        match self {
            IngestRequest::FromUrl { compress, .. } | IngestRequest::FromUpload { compress, .. } => {
                NormalizationOptions {
                    compress: *compress,
                }
            }
        }
    }
}

/// Caller-controlled part of normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizationOptions {
    /// Resize to the fixed canvas and recompress, when the content is image-typed.
    pub compress: bool,
}

/// An object as held by the store. Identity is the filename.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub filename: CanonicalFilename,
    pub content: Bytes,
}

impl StoredObject {
    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}
