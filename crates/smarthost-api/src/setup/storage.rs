//! Storage setup and initialization

use anyhow::Result;
use smarthost_core::Config;
use smarthost_services::{LocalStorage, Storage};
use std::sync::Arc;

/// Create the storage root if needed and open the store over it.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!(
        root = %config.storage_root().display(),
        policy = %config.collision_policy(),
        "Initializing local storage..."
    );

    let storage = LocalStorage::new(config.storage_root(), config.collision_policy()).await?;

    tracing::info!("Local storage initialized successfully");
    Ok(Arc::new(storage))
}
