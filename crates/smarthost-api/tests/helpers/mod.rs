//! Test helpers: build the router over an isolated storage root.
//!
//! Run from workspace root: `cargo test -p smarthost-api --test files_test`.

pub mod fixtures;

use axum_test::TestServer;
use smarthost_core::{CollisionPolicy, Config};
use std::path::Path;
use tempfile::TempDir;

/// Test application: server plus the temp dir backing its storage root.
pub struct TestApp {
    pub server: TestServer,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Names of the entries in the storage root, sorted.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.storage_root())
            .expect("read storage root")
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_policy(CollisionPolicy::Overwrite).await
}

pub async fn setup_test_app_with_policy(policy: CollisionPolicy) -> TestApp {
    setup_test_app_with(|config| config.0.collision_policy = policy).await
}

/// Build the app over a fresh temp root, letting the caller adjust the config first.
pub async fn setup_test_app_with<F>(configure: F) -> TestApp
where
    F: FnOnce(&mut Config),
{
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut config = Config::with_storage_root(temp_dir.path());
    config.0.fetch_timeout_secs = 5;
    config.0.max_upload_size_bytes = 1024 * 1024;
    configure(&mut config);

    let (_state, router) = smarthost_api::setup::build_app(config)
        .await
        .expect("Failed to build app");

    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp { server, temp_dir }
}
