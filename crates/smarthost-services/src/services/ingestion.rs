//! Ingestion orchestrator
//!
//! Composes admission, acquisition, normalization and persistence per request variant.
//! Holds no per-request state; concurrent calls only share the store's namespace.

use crate::services::error::IngestError;
use crate::services::fetch::RemoteFetcher;
use crate::services::plan::NormalizationPlan;
use bytes::Bytes;
use smarthost_core::constants::NORMALIZED_EXTENSION;
use smarthost_core::models::SourceKind;
use smarthost_core::{CanonicalFilename, IngestRequest, NormalizationOptions};
use smarthost_processing::{FilenameValidator, ImageNormalizer, ValidationError};
use smarthost_storage::{ObjectStream, Storage, StorageError};
use std::sync::Arc;

/// Result of a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub filename: CanonicalFilename,
    pub size_bytes: u64,
    pub plan: NormalizationPlan,
}

#[derive(Clone)]
pub struct IngestionService {
    validator: FilenameValidator,
    fetcher: RemoteFetcher,
    storage: Arc<dyn Storage>,
}

impl IngestionService {
    pub fn new(
        validator: FilenameValidator,
        fetcher: RemoteFetcher,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            validator,
            fetcher,
            storage,
        }
    }

    pub fn validator(&self) -> &FilenameValidator {
        &self.validator
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Admit, acquire, normalize and persist one request.
    ///
    /// A normalized upload is stored under its stem with the JPEG extension, since the
    /// bytes no longer match the declared format. URL objects always carry that extension.
    #[tracing::instrument(
        skip(self, request),
        fields(source = ?request.source_kind(), compress = request.options().compress)
    )]
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestOutcome, IngestError> {
        let source = request.source_kind();
        let options = request.options();

        let (filename, plan, content) = match request {
            IngestRequest::FromUrl { url, .. } => {
                let filename = self.validator.admit_url(&url)?;
                let plan = self.plan_for(source, &filename, options);
                let raw = self.fetcher.fetch(&url).await?;
                (filename, plan, Self::apply(plan, raw).await?)
            }
            IngestRequest::FromUpload {
                raw_bytes,
                declared_filename,
                ..
            } => {
                let mut filename = self.validator.admit(&declared_filename)?;
                let plan = self.plan_for(source, &filename, options);
                if plan.normalizes() && filename.extension() != NORMALIZED_EXTENSION {
                    filename = filename
                        .with_extension(NORMALIZED_EXTENSION)
                        .ok_or(ValidationError::InvalidFilename(declared_filename))?;
                }
                (filename, plan, Self::apply(plan, raw_bytes).await?)
            }
        };

        self.persist(filename, content, plan).await
    }

    /// Fetch `url`, always re-encode to JPEG, resize iff `compress`, and store.
    pub async fn ingest_from_url(
        &self,
        url: &str,
        compress: bool,
    ) -> Result<IngestOutcome, IngestError> {
        self.ingest(IngestRequest::FromUrl {
            url: url.to_string(),
            compress,
        })
        .await
    }

    /// Store an uploaded body, normalizing only compressed image uploads.
    pub async fn ingest_from_upload(
        &self,
        declared_filename: &str,
        raw_bytes: Bytes,
        compress: bool,
    ) -> Result<IngestOutcome, IngestError> {
        self.ingest(IngestRequest::FromUpload {
            raw_bytes,
            declared_filename: declared_filename.to_string(),
            compress,
        })
        .await
    }

    /// Open a stored object by name. The body is streamed from disk.
    pub async fn retrieve(&self, filename: &str) -> Result<ObjectStream, IngestError> {
        match self.storage.open(filename).await {
            Ok(object) => Ok(object),
            Err(StorageError::NotFound(_)) => {
                tracing::debug!(filename = %filename, "Requested file does not exist");
                Err(IngestError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn plan_for(
        &self,
        source: SourceKind,
        filename: &CanonicalFilename,
        options: NormalizationOptions,
    ) -> NormalizationPlan {
        NormalizationPlan::decide(source, self.validator.is_image(filename), options)
    }

    /// Run the plan. Decoding is CPU-bound so it runs on the blocking pool.
    async fn apply(plan: NormalizationPlan, raw: Bytes) -> Result<Bytes, IngestError> {
        if !plan.normalizes() {
            return Ok(raw);
        }

        let resize = plan.resizes();
        tokio::task::spawn_blocking(move || ImageNormalizer::normalize(&raw, resize))
            .await
            .map_err(|e| IngestError::Internal(format!("Normalization task failed: {}", e)))?
            .map_err(IngestError::from)
    }

    async fn persist(
        &self,
        filename: CanonicalFilename,
        content: Bytes,
        plan: NormalizationPlan,
    ) -> Result<IngestOutcome, IngestError> {
        let size_bytes = self.storage.put(&filename, content).await?;

        tracing::info!(
            filename = %filename,
            size_bytes = size_bytes,
            plan = %plan,
            "Ingestion complete"
        );

        Ok(IngestOutcome {
            filename,
            size_bytes,
            plan,
        })
    }
}
