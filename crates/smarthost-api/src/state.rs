//! Application state shared by every handler.

use smarthost_core::Config;
use smarthost_services::IngestionService;

/// Process-wide state. Built once at startup and never mutated afterwards.
pub struct AppState {
    pub config: Config,
    pub ingestion: IngestionService,
}

impl AppState {
    pub fn new(config: Config, ingestion: IngestionService) -> Self {
        Self { config, ingestion }
    }
}
