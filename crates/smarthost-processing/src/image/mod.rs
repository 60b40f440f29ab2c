//! Image processing module
//!
//! Raster normalization: decode, flatten onto an opaque background, optionally resize to
//! the fixed canvas, re-encode as JPEG.

pub mod normalizer;

pub use normalizer::{ImageNormalizer, NormalizeError};
