//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pypi_bump::error::{IndexError, PublishError};
use pypi_bump::index::PackageIndex;
use pypi_bump::publish::{CommandLine, CommandRunner, PublishStep};

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a PyPI JSON API fixture.
pub fn pypi_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("pypi").join(name)
}

/// Get the path to a manifest fixture.
pub fn manifest_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("manifests").join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Write `content` as `pyproject.toml` in `dir` and return its path.
pub fn write_manifest(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("pyproject.toml");
    std::fs::write(&path, content).expect("Failed to write manifest");
    path
}

/// Minimal PyPI JSON API project body listing `versions`.
pub fn pypi_body(latest: &str, versions: &[&str]) -> Value {
    let mut releases = Map::new();
    for v in versions {
        releases.insert(
            v.to_string(),
            json!([{
                "filename": format!("pkg-{}.tar.gz", v),
                "packagetype": "sdist",
                "yanked": false
            }]),
        );
    }
    json!({
        "info": { "name": "pkg", "version": latest },
        "releases": Value::Object(releases),
        "urls": []
    })
}

/// Mount `body` at `/pypi/{project}/json` on the mock server.
pub async fn mount_project(server: &MockServer, project: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/pypi/{}/json", project)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Base URL to hand to `PypiIndex::with_base_url` for a mock server.
pub fn index_url(server: &MockServer) -> String {
    format!("{}/pypi", server.uri())
}

/// Index that answers from a fixed listing.
pub struct StaticIndex {
    pub versions: Option<Vec<String>>,
}

impl StaticIndex {
    pub fn listing(versions: &[&str]) -> Self {
        Self {
            versions: Some(versions.iter().map(|v| v.to_string()).collect()),
        }
    }

    pub fn not_found() -> Self {
        Self { versions: None }
    }
}

#[async_trait]
impl PackageIndex for StaticIndex {
    async fn published_versions(&self, package: &str) -> Result<Vec<String>, IndexError> {
        self.versions
            .clone()
            .ok_or_else(|| IndexError::PackageNotFound(package.to_string()))
    }
}

/// Runner that records each call instead of spawning anything.
#[derive(Default)]
pub struct RecordingRunner {
    pub calls: Mutex<Vec<(PublishStep, String, PathBuf)>>,
    pub fail_on: Option<PublishStep>,
}

impl RecordingRunner {
    pub fn failing_on(step: PublishStep) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(step),
        }
    }

    pub fn steps(&self) -> Vec<PublishStep> {
        self.calls
            .lock()
            .expect("runner lock poisoned")
            .iter()
            .map(|(step, _, _)| *step)
            .collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, step: PublishStep, command: &CommandLine, cwd: &Path) -> Result<(), PublishError> {
        self.calls
            .lock()
            .expect("runner lock poisoned")
            .push((step, command.to_string(), cwd.to_path_buf()));

        if self.fail_on == Some(step) {
            return Err(PublishError::NonZeroExit { step, code: Some(1) });
        }
        Ok(())
    }
}
