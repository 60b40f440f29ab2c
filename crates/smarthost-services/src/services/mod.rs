pub mod error;
pub mod fetch;
pub mod ingestion;
pub mod plan;
pub mod upload;
