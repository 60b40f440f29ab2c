use smarthost_core::constants::{MAX_FILENAME_LENGTH, URL_INGEST_EXTENSION};
use smarthost_core::{CanonicalFilename, Config};
use std::fmt;
use std::sync::Arc;

/// Admission and sanitization errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid file type: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid file type: {0} has no extension")]
    MissingExtension(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

/// Derives the stem of a stored name from a source URL.
pub trait StemStrategy: Send + Sync + fmt::Debug {
    /// Raw, unsanitized stem for `url`.
    fn stem_from_url(&self, url: &str) -> String;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

/// Uses the text after the last `=` of the URL as the stem.
///
/// Meant for URLs shaped like `https://host/image?id=abc123`, which become `abc123`.
/// A URL with no `=` yields the whole URL, which sanitization then flattens
/// (`https://host/a.png` becomes `https_host_a.png`). No attempt is made to do better
/// for other shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlQueryValueAsStem;

impl StemStrategy for UrlQueryValueAsStem {
    fn stem_from_url(&self, url: &str) -> String {
        url.rsplit('=').next().unwrap_or(url).to_string()
    }

    fn name(&self) -> &'static str {
        "url_query_value_as_stem"
    }
}

/// Reduce an arbitrary string to a name that is safe as a single directory entry.
///
/// Non-ASCII characters are dropped, path separators and whitespace runs become a
/// single `_`, anything outside `[A-Za-z0-9_.-]` is removed, runs of dots collapse to
/// one, and leading or trailing `.`/`_` are stripped. The result may be empty.
pub fn sanitize_filename(name: &str) -> String {
    let ascii: String = name
        .chars()
        .filter(|c| c.is_ascii())
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    let mut cleaned = String::with_capacity(joined.len());
    for c in joined.chars() {
        if !(c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-') {
            continue;
        }
        if c == '.' && cleaned.ends_with('.') {
            continue;
        }
        cleaned.push(c);
    }

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Shorten the stem so the whole name fits, keeping the extension intact.
fn truncate_to_limit(name: String) -> String {
    if name.len() <= MAX_FILENAME_LENGTH {
        return name;
    }

    match name.rsplit_once('.') {
        Some((stem, ext)) if ext.len() + 2 <= MAX_FILENAME_LENGTH => {
            let keep = MAX_FILENAME_LENGTH - ext.len() - 1;
            // sanitized names are ASCII, so byte slicing is safe
            let stem = stem[..keep.min(stem.len())].trim_end_matches(|c| c == '.' || c == '_');
            format!("{}.{}", stem, ext)
        }
        _ => name[..MAX_FILENAME_LENGTH].to_string(),
    }
}

fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Extension allow-list check plus filename sanitization.
///
/// The only producer of `CanonicalFilename` values in the pipeline.
#[derive(Debug, Clone)]
pub struct FilenameValidator {
    allowed_extensions: Vec<String>,
    image_extensions: Vec<String>,
    stem_strategy: Arc<dyn StemStrategy>,
}

impl FilenameValidator {
    pub fn new(allowed_extensions: Vec<String>, image_extensions: Vec<String>) -> Self {
        Self {
            allowed_extensions: normalize_list(allowed_extensions),
            image_extensions: normalize_list(image_extensions),
            stem_strategy: Arc::new(UrlQueryValueAsStem),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.allowed_extensions().to_vec(),
            config.image_extensions().to_vec(),
        )
    }

    /// Replace the URL stem heuristic.
    pub fn with_stem_strategy(mut self, strategy: impl StemStrategy + 'static) -> Self {
        self.stem_strategy = Arc::new(strategy);
        self
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Check that `extension` (without the dot, any case) is admitted.
    pub fn validate_extension(&self, extension: &str) -> Result<(), ValidationError> {
        let extension = extension.to_lowercase();
        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }
        Ok(())
    }

    /// Admit a client-declared filename.
    ///
    /// The declared extension is checked first, then the name is sanitized and the
    /// result re-checked, so the stored name always carries an admitted extension.
    pub fn admit(&self, filename_hint: &str) -> Result<CanonicalFilename, ValidationError> {
        let declared = extension_of(filename_hint)
            .ok_or_else(|| ValidationError::MissingExtension(filename_hint.to_string()))?;
        self.validate_extension(&declared)?;

        let sanitized = truncate_to_limit(sanitize_filename(filename_hint));

        let extension = extension_of(&sanitized)
            .ok_or_else(|| ValidationError::InvalidFilename(filename_hint.to_string()))?;
        self.validate_extension(&extension)?;

        let canonical = CanonicalFilename::from_sanitized(sanitized)
            .ok_or_else(|| ValidationError::InvalidFilename(filename_hint.to_string()))?;

        tracing::debug!(
            declared = %filename_hint,
            canonical = %canonical,
            "Filename admitted"
        );

        Ok(canonical)
    }

    /// Derive and admit the stored name for a URL ingestion.
    ///
    /// The extension is always the URL-ingest extension, whatever the remote serves.
    pub fn admit_url(&self, url: &str) -> Result<CanonicalFilename, ValidationError> {
        let stem = self.stem_strategy.stem_from_url(url);
        let candidate = format!("{}.{}", stem, URL_INGEST_EXTENSION);

        tracing::debug!(
            url = %url,
            strategy = self.stem_strategy.name(),
            candidate = %candidate,
            "Derived filename from URL"
        );

        self.admit(&candidate)
    }

    /// Whether the name's extension is one the normalizer decodes.
    pub fn is_image(&self, filename: &CanonicalFilename) -> bool {
        self.image_extensions.contains(&filename.extension())
    }
}

impl Default for FilenameValidator {
    fn default() -> Self {
        use smarthost_core::constants::{DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_IMAGE_EXTENSIONS};

        Self::new(
            DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_IMAGE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

fn normalize_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().trim_start_matches('.').to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator() -> FilenameValidator {
        FilenameValidator::new(
            vec!["jpg".to_string(), "png".to_string(), "pdf".to_string()],
            vec!["jpg".to_string(), "png".to_string()],
        )
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(sanitize_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("i contain cool \u{fc}ml\u{e4}uts.txt"), "i_contain_cool_mluts.txt");
        assert_eq!(sanitize_filename("a..b...png"), "a.b.png");
        assert_eq!(sanitize_filename("C:\\Windows\\evil.png"), "C_Windows_evil.png");
        assert_eq!(sanitize_filename("..."), "");
    }

    #[test]
    fn test_admit_ok() {
        let validator = test_validator();
        assert_eq!(validator.admit("photo.png").unwrap().as_str(), "photo.png");
        assert_eq!(validator.admit("Scan 01.PDF").unwrap().as_str(), "Scan_01.PDF"); // case insensitive
    }

    #[test]
    fn test_admit_rejects_disallowed_extension() {
        let validator = test_validator();
        assert!(matches!(
            validator.admit("script.exe"),
            Err(ValidationError::InvalidExtension { .. })
        ));
        assert!(matches!(
            validator.admit("archive.png.exe"),
            Err(ValidationError::InvalidExtension { .. })
        ));
    }

    #[test]
    fn test_admit_rejects_missing_extension() {
        let validator = test_validator();
        assert!(matches!(
            validator.admit("README"),
            Err(ValidationError::MissingExtension(_))
        ));
        assert!(matches!(
            validator.admit("trailing."),
            Err(ValidationError::MissingExtension(_))
        ));
    }

    #[test]
    fn test_admit_rejects_empty_stem() {
        let validator = test_validator();
        assert!(matches!(
            validator.admit(".png"),
            Err(ValidationError::InvalidFilename(_))
        ));
        assert!(validator.admit("\u{4e2d}\u{6587}.png").is_err());
    }

    #[test]
    fn test_admit_traversal_stays_inside_root() {
        let validator = test_validator();
        let name = validator.admit("../../secret/photo.png").unwrap();
        assert_eq!(name.as_str(), "secret_photo.png");
        assert!(!name.as_str().contains('/'));
    }

    #[test]
    fn test_admit_truncates_long_names() {
        let validator = test_validator();
        let long = format!("{}.png", "a".repeat(400));
        let name = validator.admit(&long).unwrap();
        assert_eq!(name.as_str().len(), MAX_FILENAME_LENGTH);
        assert_eq!(name.extension(), "png");
    }

    #[test]
    fn test_admit_url_uses_last_query_value() {
        let validator = test_validator();
        let name = validator
            .admit_url("https://cdn.example.com/fetch?size=large&id=abc123")
            .unwrap();
        assert_eq!(name.as_str(), "abc123.jpg");
    }

    #[test]
    fn test_admit_url_without_equals_uses_whole_url() {
        let validator = test_validator();
        let name = validator.admit_url("https://example.com/pics/cat").unwrap();
        assert_eq!(name.as_str(), "https_example.com_pics_cat.jpg");
    }

    #[test]
    fn test_admit_url_ignores_remote_extension() {
        let validator = test_validator();
        let name = validator.admit_url("https://example.com/a?file=doc.pdf").unwrap();
        assert_eq!(name.as_str(), "doc.pdf.jpg");
        assert_eq!(name.extension(), "jpg");
    }

    #[test]
    fn test_custom_stem_strategy() {
        #[derive(Debug)]
        struct Fixed;
        impl StemStrategy for Fixed {
            fn stem_from_url(&self, _url: &str) -> String {
                "fixed".to_string()
            }
            fn name(&self) -> &'static str {
                "fixed"
            }
        }

        let validator = test_validator().with_stem_strategy(Fixed);
        assert_eq!(
            validator.admit_url("https://example.com/?id=1").unwrap().as_str(),
            "fixed.jpg"
        );
    }

    #[test]
    fn test_is_image() {
        let validator = test_validator();
        assert!(validator.is_image(&validator.admit("a.PNG").unwrap()));
        assert!(!validator.is_image(&validator.admit("a.pdf").unwrap()));
    }

    #[test]
    fn test_default_allow_list() {
        let validator = FilenameValidator::default();
        assert!(validator.admit("song.mp3").is_ok());
        assert!(validator.admit("clip.mp4").is_err());
        assert!(!validator.is_image(&validator.admit("song.ogg").unwrap()));
    }
}
