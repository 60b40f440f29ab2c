//! Smarthost Media Processing Library
//!
//! This crate provides the pure parts of the ingestion pipeline: admission control and
//! filename sanitization (`validator`), and raster normalization (`image`).
//! Nothing here touches the network or the filesystem.

pub mod validator;

#[cfg(feature = "image")]
pub mod image;

// Re-export commonly used types
pub use validator::{
    sanitize_filename, FilenameValidator, StemStrategy, UrlQueryValueAsStem, ValidationError,
};

#[cfg(feature = "image")]
pub use image::{ImageNormalizer, NormalizeError};
