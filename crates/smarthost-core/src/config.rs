//! Configuration module
//!
//! Process-wide settings are read once at startup and never mutated. The storage
//! root is carried here and injected into the object store at construction, so tests
//! can point each case at its own temporary directory.

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_IMAGE_EXTENSIONS, URL_INGEST_EXTENSION};
use crate::storage_types::CollisionPolicy;

// Common constants
const SERVER_PORT: u16 = 8000;
const UPLOAD_DIR: &str = "uploads";
const MAX_UPLOAD_SIZE_MB: usize = 25;
const FETCH_TIMEOUT_SECS: u64 = 60;
const FETCH_MAX_SIZE_MB: usize = 25;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Requests processed at once across all routes.
    pub http_concurrency_limit: usize,
}

/// Ingestion configuration
#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub base: BaseConfig,
    pub storage_root: PathBuf,
    pub collision_policy: CollisionPolicy,
    pub allowed_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
    pub max_upload_size_bytes: usize,
    pub fetch_timeout_secs: u64,
    pub fetch_max_size_bytes: usize,
    pub fetch_accept_invalid_certs: bool,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<IngestConfig>);

impl Config {
    fn as_ingest(&self) -> &IngestConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = IngestConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    /// Defaults with the storage root replaced. Used by tests and embedders.
    pub fn with_storage_root(root: impl Into<PathBuf>) -> Self {
        let mut config = IngestConfig::defaults();
        config.storage_root = root.into();
        Config(Box::new(config))
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_ingest().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    /// Fail fast on settings that would make ingestion misbehave.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let cfg = self.as_ingest();

        if cfg.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS cannot be empty"));
        }

        // URL ingestion always stores under this extension
        if !cfg
            .allowed_extensions
            .iter()
            .any(|ext| ext == URL_INGEST_EXTENSION)
        {
            return Err(anyhow::anyhow!(
                "ALLOWED_EXTENSIONS must contain '{}', the extension given to URL-ingested files",
                URL_INGEST_EXTENSION
            ));
        }

        if let Some(ext) = cfg
            .image_extensions
            .iter()
            .find(|ext| !cfg.allowed_extensions.contains(ext))
        {
            return Err(anyhow::anyhow!(
                "IMAGE_EXTENSIONS contains '{}' which is not in ALLOWED_EXTENSIONS",
                ext
            ));
        }

        if cfg.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("Max upload size cannot be 0"));
        }

        if cfg.fetch_max_size_bytes == 0 {
            return Err(anyhow::anyhow!("Max fetch size cannot be 0"));
        }

        if cfg.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT cannot be 0"));
        }

        if cfg.fetch_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Fetch timeout cannot be 0"));
        }

        if self.is_production() && cfg.base.cors_origins.iter().any(|o| o == "*") {
            tracing::warn!("CORS allows all origins in production");
        }

        if cfg.fetch_accept_invalid_certs {
            tracing::warn!(
                "TLS certificate verification is disabled for URL ingestion (FETCH_ACCEPT_INVALID_CERTS=true)"
            );
        }

        Ok(())
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_ingest().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_ingest().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_ingest().base.environment
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_ingest().base.http_concurrency_limit
    }

    pub fn storage_root(&self) -> &Path {
        &self.as_ingest().storage_root
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        self.as_ingest().collision_policy
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.as_ingest().allowed_extensions
    }

    pub fn image_extensions(&self) -> &[String] {
        &self.as_ingest().image_extensions
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_ingest().max_upload_size_bytes
    }

    pub fn fetch_timeout_secs(&self) -> u64 {
        self.as_ingest().fetch_timeout_secs
    }

    pub fn fetch_max_size_bytes(&self) -> usize {
        self.as_ingest().fetch_max_size_bytes
    }

    pub fn fetch_accept_invalid_certs(&self) -> bool {
        self.as_ingest().fetch_accept_invalid_certs
    }
}

fn extension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn default_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl IngestConfig {
    pub fn defaults() -> Self {
        IngestConfig {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
            },
            storage_root: env::current_dir()
                .map(|cwd| cwd.join(UPLOAD_DIR))
                .unwrap_or_else(|_| PathBuf::from(UPLOAD_DIR)),
            collision_policy: CollisionPolicy::Overwrite,
            allowed_extensions: default_list(DEFAULT_ALLOWED_EXTENSIONS),
            image_extensions: default_list(DEFAULT_IMAGE_EXTENSIONS),
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            fetch_timeout_secs: FETCH_TIMEOUT_SECS,
            fetch_max_size_bytes: FETCH_MAX_SIZE_MB * 1024 * 1024,
            fetch_accept_invalid_certs: true,
        }
    }

    /// Build from a key lookup (the process environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::defaults();

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or(defaults.base.environment);

        let server_port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => defaults.base.server_port,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.base.cors_origins);

        let http_concurrency_limit = match lookup("HTTP_CONCURRENCY_LIMIT") {
            Some(limit) => limit
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be a valid number"))?,
            None => defaults.base.http_concurrency_limit,
        };

        let storage_root = lookup("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_root);

        let collision_policy = match lookup("COLLISION_POLICY") {
            Some(policy) => policy.parse()?,
            None => defaults.collision_policy,
        };

        let allowed_extensions = lookup("ALLOWED_EXTENSIONS")
            .map(|s| extension_list(&s))
            .unwrap_or(defaults.allowed_extensions);

        let image_extensions = lookup("IMAGE_EXTENSIONS")
            .map(|s| extension_list(&s))
            .unwrap_or(defaults.image_extensions);

        let max_upload_size_bytes = lookup("MAX_UPLOAD_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(defaults.max_upload_size_bytes);

        let fetch_timeout_secs = lookup("FETCH_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.fetch_timeout_secs);

        let fetch_max_size_bytes = lookup("FETCH_MAX_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(defaults.fetch_max_size_bytes);

        let fetch_accept_invalid_certs = lookup("FETCH_ACCEPT_INVALID_CERTS")
            .map(|s| s.trim().to_lowercase())
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.fetch_accept_invalid_certs);

        Ok(IngestConfig {
            base: BaseConfig {
                server_port,
                cors_origins,
                environment,
                http_concurrency_limit,
            },
            storage_root,
            collision_policy,
            allowed_extensions,
            image_extensions,
            max_upload_size_bytes,
            fetch_timeout_secs,
            fetch_max_size_bytes,
            fetch_accept_invalid_certs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let cfg = IngestConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.base.server_port, 8000);
        assert!(cfg.storage_root.ends_with("uploads"));
        assert_eq!(cfg.collision_policy, CollisionPolicy::Overwrite);
        assert!(cfg.allowed_extensions.contains(&"png".to_string()));
        assert!(cfg.allowed_extensions.contains(&"mp3".to_string()));
        assert!(!cfg.image_extensions.contains(&"mp3".to_string()));
        assert_eq!(cfg.fetch_timeout_secs, 60);
        assert!(cfg.fetch_accept_invalid_certs);
        assert_eq!(cfg.base.http_concurrency_limit, 10_000);
    }

    #[test]
    fn test_overrides_are_parsed() {
        let cfg = IngestConfig::from_lookup(lookup_from(&[
            ("PORT", "9100"),
            ("UPLOAD_DIR", "/srv/media"),
            ("ALLOWED_EXTENSIONS", " PNG, .jpg ,pdf,"),
            ("IMAGE_EXTENSIONS", "png,jpg"),
            ("COLLISION_POLICY", "reject"),
            ("FETCH_TIMEOUT_SECS", "5"),
            ("FETCH_ACCEPT_INVALID_CERTS", "FALSE"),
            ("HTTP_CONCURRENCY_LIMIT", " 64 "),
        ]))
        .unwrap();
        assert_eq!(cfg.base.server_port, 9100);
        assert_eq!(cfg.storage_root, PathBuf::from("/srv/media"));
        assert_eq!(cfg.allowed_extensions, vec!["png", "jpg", "pdf"]);
        assert_eq!(cfg.collision_policy, CollisionPolicy::Reject);
        assert_eq!(cfg.fetch_timeout_secs, 5);
        assert!(!cfg.fetch_accept_invalid_certs);
        assert_eq!(cfg.base.http_concurrency_limit, 64);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(IngestConfig::from_lookup(lookup_from(&[("PORT", "http")])).is_err());
        assert!(
            IngestConfig::from_lookup(lookup_from(&[("HTTP_CONCURRENCY_LIMIT", "lots")])).is_err()
        );
    }

    #[test]
    fn test_validate_requires_url_ingest_extension() {
        let cfg = IngestConfig::from_lookup(lookup_from(&[
            ("ALLOWED_EXTENSIONS", "png,pdf"),
            ("IMAGE_EXTENSIONS", "png"),
        ]))
        .unwrap();
        let err = Config(Box::new(cfg)).validate().unwrap_err();
        assert!(err.to_string().contains("'jpg'"));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency_limit() {
        let mut config = Config::with_storage_root("/tmp/smarthost-test");
        config.0.base.http_concurrency_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_image_extension_outside_allow_list() {
        let cfg = IngestConfig::from_lookup(lookup_from(&[
            ("ALLOWED_EXTENSIONS", "jpg,pdf"),
            ("IMAGE_EXTENSIONS", "png"),
        ]))
        .unwrap();
        assert!(Config(Box::new(cfg)).validate().is_err());
    }

    #[test]
    fn test_with_storage_root_validates() {
        let config = Config::with_storage_root("/tmp/smarthost-test");
        assert_eq!(config.storage_root(), Path::new("/tmp/smarthost-test"));
        assert!(config.validate().is_ok());
    }
}
