//! Storage abstraction trait
//!
//! This module defines the Storage trait that the object store implements.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use smarthost_core::{CanonicalFilename, CollisionPolicy, StoredObject};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// An object opened for reading, with its body still on disk.
pub struct ObjectStream {
    pub filename: CanonicalFilename,
    pub size_bytes: u64,
    pub body: BoxStream<'static, std::io::Result<Bytes>>,
}

impl fmt::Debug for ObjectStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStream")
            .field("filename", &self.filename)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

/// Storage abstraction trait
///
/// Objects are addressed by canonical filename only. `put` takes the typed name, so
/// nothing unsanitized can be written; `get` and `exists` take raw names from callers
/// and re-check them, failing closed with `NotFound`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist `data` under `filename` and return the number of bytes written.
    ///
    /// The object only becomes visible under its final name once fully written.
    /// What happens when the name already exists depends on the collision policy.
    async fn put(&self, filename: &CanonicalFilename, data: Bytes) -> StorageResult<u64>;

    /// Read an object fully into memory.
    async fn get(&self, filename: &str) -> StorageResult<StoredObject>;

    /// Open an object and return its body as a chunked stream.
    async fn open(&self, filename: &str) -> StorageResult<ObjectStream>;

    /// Check if an object exists. Non-canonical names never exist.
    async fn exists(&self, filename: &str) -> bool;

    /// Root directory backing this store.
    fn root(&self) -> &Path;

    /// Collision policy applied by `put`.
    fn collision_policy(&self) -> CollisionPolicy;
}
