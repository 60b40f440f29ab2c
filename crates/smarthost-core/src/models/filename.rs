//! Canonical filename: the only name the object store accepts.

use serde::Serialize;
use std::fmt;

use crate::constants::MAX_FILENAME_LENGTH;

/// A sanitized, allow-listed name under which an object is stored and retrieved.
///
/// Invariants checked on construction: non-empty, at most `MAX_FILENAME_LENGTH` bytes,
/// no path separators or NUL, no leading dot, no `..`, and a non-empty stem and
/// extension around the last dot. A value of this type always resolves to a direct
/// child of the storage root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalFilename(String);

impl CanonicalFilename {
    /// Wrap an already-sanitized name, returning `None` if any invariant fails.
    pub fn from_sanitized(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if Self::is_canonical(&name) {
            Some(Self(name))
        } else {
            None
        }
    }

    /// Check the invariants without allocating.
    pub fn is_canonical(name: &str) -> bool {
        if name.is_empty() || name.len() > MAX_FILENAME_LENGTH {
            return false;
        }
        if name.starts_with('.') || name.contains("..") {
            return false;
        }
        if name.chars().any(|c| c == '/' || c == '\\' || c == '\0') {
            return false;
        }
        match name.rsplit_once('.') {
            Some((stem, ext)) => !stem.is_empty() && !ext.is_empty(),
            None => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extension after the last dot, lowercased.
    pub fn extension(&self) -> String {
        self.0
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }

    /// Everything before the last dot.
    pub fn stem(&self) -> &str {
        self.0.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(&self.0)
    }

    /// Same stem with a different extension.
    pub fn with_extension(&self, extension: &str) -> Option<Self> {
        Self::from_sanitized(format!("{}.{}", self.stem(), extension))
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalFilename {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_names() {
        let name = CanonicalFilename::from_sanitized("photo.PNG").unwrap();
        assert_eq!(name.as_str(), "photo.PNG");
        assert_eq!(name.extension(), "png");
        assert_eq!(name.stem(), "photo");
    }

    #[test]
    fn test_rejects_escaping_names() {
        assert!(CanonicalFilename::from_sanitized("../etc/passwd.png").is_none());
        assert!(CanonicalFilename::from_sanitized("/abs.png").is_none());
        assert!(CanonicalFilename::from_sanitized("dir\\file.png").is_none());
        assert!(CanonicalFilename::from_sanitized(".hidden.png").is_none());
        assert!(CanonicalFilename::from_sanitized("a..png").is_none());
    }

    #[test]
    fn test_rejects_missing_parts() {
        assert!(CanonicalFilename::from_sanitized("").is_none());
        assert!(CanonicalFilename::from_sanitized("noextension").is_none());
        assert!(CanonicalFilename::from_sanitized("trailing.").is_none());
    }

    #[test]
    fn test_rejects_overlong_names() {
        let name = format!("{}.png", "a".repeat(MAX_FILENAME_LENGTH));
        assert!(CanonicalFilename::from_sanitized(name).is_none());
    }

    #[test]
    fn test_with_extension_keeps_stem() {
        let name = CanonicalFilename::from_sanitized("report.v2.png").unwrap();
        let jpg = name.with_extension("jpg").unwrap();
        assert_eq!(jpg.as_str(), "report.v2.jpg");
    }
}
