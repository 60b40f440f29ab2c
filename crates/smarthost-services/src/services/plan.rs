//! Normalization decision table
//!
//! | source | image-typed | compress | plan             |
//! |--------|-------------|----------|------------------|
//! | url    | always      | true     | FlattenAndResize |
//! | url    | always      | false    | FlattenOnly      |
//! | upload | yes         | true     | FlattenAndResize |
//! | upload | yes         | false    | StoreAsIs        |
//! | upload | no          | any      | StoreAsIs        |
//!
//! URL ingestion always re-encodes: `compress=false` only skips the resize there, while
//! on the upload path it skips normalization entirely.

use smarthost_core::models::SourceKind;
use smarthost_core::NormalizationOptions;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizationPlan {
    /// Persist the acquired bytes unchanged.
    StoreAsIs,
    /// Decode, flatten to RGB, re-encode as JPEG at the source dimensions.
    FlattenOnly,
    /// Decode, flatten, resize to the fixed canvas, re-encode as JPEG.
    FlattenAndResize,
}

impl NormalizationPlan {
    pub fn decide(source: SourceKind, is_image: bool, options: NormalizationOptions) -> Self {
        match (source, is_image, options.compress) {
            (SourceKind::Url, _, true) => NormalizationPlan::FlattenAndResize,
            (SourceKind::Url, _, false) => NormalizationPlan::FlattenOnly,
            (SourceKind::Upload, true, true) => NormalizationPlan::FlattenAndResize,
            (SourceKind::Upload, true, false) => NormalizationPlan::StoreAsIs,
            (SourceKind::Upload, false, _) => NormalizationPlan::StoreAsIs,
        }
    }

    /// Whether the bytes go through the normalizer at all.
    pub fn normalizes(self) -> bool {
        !matches!(self, NormalizationPlan::StoreAsIs)
    }

    pub fn resizes(self) -> bool {
        matches!(self, NormalizationPlan::FlattenAndResize)
    }
}

impl fmt::Display for NormalizationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizationPlan::StoreAsIs => write!(f, "store_as_is"),
            NormalizationPlan::FlattenOnly => write!(f, "flatten_only"),
            NormalizationPlan::FlattenAndResize => write!(f, "flatten_and_resize"),
        }
    }
}
