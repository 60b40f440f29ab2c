//! Compiled-in constants for ingestion and normalization.

/// Extensions admitted when `ALLOWED_EXTENSIONS` is not set: image formats, pdf and a few audio formats.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "bmp", "pdf", "mp3", "wav", "ogg",
];

/// Subset of the allow-list that is decoded by the image normalizer.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Extension given to every URL-ingested object, whatever the remote content type.
pub const URL_INGEST_EXTENSION: &str = "jpg";

/// Extension of normalized output.
pub const NORMALIZED_EXTENSION: &str = "jpg";

/// Fixed canvas used when compression is requested. Aspect ratio is not preserved.
pub const NORMALIZED_WIDTH: u32 = 640;
pub const NORMALIZED_HEIGHT: u32 = 640;

/// JPEG quality used for every re-encode.
pub const JPEG_QUALITY: u8 = 95;

/// Longest canonical filename accepted, in bytes.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Message returned by both ingestion routes.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";
