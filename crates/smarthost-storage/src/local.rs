use crate::traits::{ObjectStream, Storage, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use smarthost_core::{CanonicalFilename, CollisionPolicy, StoredObject};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    policy: CollisionPolicy,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Flat directory holding every object (e.g., "./uploads"); created if missing
    /// * `policy` - What `put` does when the target name already exists
    pub async fn new(base_path: impl Into<PathBuf>, policy: CollisionPolicy) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path, policy })
    }

    /// Resolve a caller-supplied name to a path strictly inside the root.
    ///
    /// Anything that is not already canonical, or that resolves elsewhere through a
    /// symlink, is reported as `NotFound` rather than followed.
    fn name_to_path(&self, filename: &str) -> StorageResult<PathBuf> {
        if !CanonicalFilename::is_canonical(filename) {
            tracing::debug!(filename = %filename, "Rejected non-canonical filename");
            return Err(StorageError::NotFound(filename.to_string()));
        }

        let path = self.base_path.join(filename);

        if let (Ok(base_canonical), Ok(canonical)) =
            (self.base_path.canonicalize(), path.canonicalize())
        {
            if canonical.parent() != Some(base_canonical.as_path()) {
                tracing::warn!(filename = %filename, "Filename resolves outside storage directory");
                return Err(StorageError::NotFound(filename.to_string()));
            }
        }

        Ok(path)
    }

    /// Hidden sibling used while the object is being written.
    ///
    /// Named from the uuid alone so it stays short even when the target name is at the
    /// length limit.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(format!(".{}.tmp", Uuid::new_v4().simple()))
    }

    async fn write_temp(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    /// Move a fully written temp file onto its final name according to the policy.
    async fn commit(&self, temp: &Path, target: &Path, filename: &CanonicalFilename) -> StorageResult<()> {
        match self.policy {
            CollisionPolicy::Overwrite => fs::rename(temp, target).await.map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to move {} into place: {}",
                    target.display(),
                    e
                ))
            }),
            // hard_link fails if the target exists, which makes the check and the publish one step
            CollisionPolicy::Reject => match fs::hard_link(temp, target).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    Err(StorageError::AlreadyExists(filename.to_string()))
                }
                Err(e) => Err(StorageError::WriteFailed(format!(
                    "Failed to link {} into place: {}",
                    target.display(),
                    e
                ))),
            },
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(&self, filename: &CanonicalFilename, data: Bytes) -> StorageResult<u64> {
        let target = self.base_path.join(filename.as_str());
        let temp = self.temp_path();
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let result = match self.write_temp(&temp, &data).await {
            Ok(()) => self.commit(&temp, &target, filename).await,
            Err(e) => Err(e),
        };

        // After a successful rename the temp path no longer exists; in every other case it must go.
        if result.is_err() || self.policy == CollisionPolicy::Reject {
            if let Err(e) = fs::remove_file(&temp).await {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(path = %temp.display(), error = %e, "Failed to remove temp file");
                }
            }
        }

        result?;

        tracing::info!(
            path = %target.display(),
            filename = %filename,
            size_bytes = size,
            policy = %self.policy,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage put successful"
        );

        Ok(size)
    }

    async fn get(&self, filename: &str) -> StorageResult<StoredObject> {
        let path = self.name_to_path(filename)?;
        let start = std::time::Instant::now();

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to read file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let name = CanonicalFilename::from_sanitized(filename)
            .ok_or_else(|| StorageError::NotFound(filename.to_string()))?;

        tracing::info!(
            path = %path.display(),
            filename = %filename,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage get successful"
        );

        Ok(StoredObject {
            filename: name,
            content: Bytes::from(data),
        })
    }

    async fn open(&self, filename: &str) -> StorageResult<ObjectStream> {
        let path = self.name_to_path(filename)?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => {
                return Err(StorageError::ReadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let metadata = file.metadata().await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to stat file {}: {}", path.display(), e))
        })?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(filename.to_string()));
        }

        let name = CanonicalFilename::from_sanitized(filename)
            .ok_or_else(|| StorageError::NotFound(filename.to_string()))?;

        tracing::debug!(
            path = %path.display(),
            size_bytes = metadata.len(),
            "Local storage open successful"
        );

        Ok(ObjectStream {
            filename: name,
            size_bytes: metadata.len(),
            body: ReaderStream::new(file).boxed(),
        })
    }

    async fn exists(&self, filename: &str) -> bool {
        match self.name_to_path(filename) {
            Ok(path) => fs::metadata(&path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    fn root(&self) -> &Path {
        &self.base_path
    }

    fn collision_policy(&self) -> CollisionPolicy {
        self.policy
    }
}
