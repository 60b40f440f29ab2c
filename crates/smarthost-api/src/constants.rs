//! Route prefixes shared by the router and the OpenAPI document.

/// Prefix of every JSON route.
pub const API_PREFIX: &str = "/api";

/// Mount point of the static view over the storage root.
pub const FILES_MOUNT: &str = "/files";

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Headroom above the file size limit for multipart boundaries and headers.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;
