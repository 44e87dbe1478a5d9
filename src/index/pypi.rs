//! PyPI JSON API backend.
//!
//! Queries `GET {base}/{project}/json` and lists every release key. Yanked
//! releases are kept: PyPI never accepts a reused version number.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::debug;

use crate::error::IndexError;
use crate::retry::retry_with_backoff;

use super::PackageIndex;
use super::listing::normalize_package_name;

/// Base URL of the public PyPI JSON API.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org/pypi";

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    info: ProjectInfo,
    #[serde(default)]
    releases: BTreeMap<String, IgnoredAny>,
}

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    #[serde(default)]
    version: Option<String>,
}

/// Client for a PyPI-compatible JSON API.
pub struct PypiIndex {
    client: Client,
    base_url: String,
}

impl PypiIndex {
    /// Client for the public PyPI.
    pub fn new() -> Result<Self, IndexError> {
        Self::with_base_url(DEFAULT_INDEX_URL)
    }

    /// Client for any PyPI-compatible JSON API (TestPyPI, a mirror, a mock server).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("pypi-bump/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(IndexError::ClientBuild)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn project_url(&self, package: &str) -> String {
        format!("{}/{}/json", self.base_url, normalize_package_name(package))
    }

    /// Single request, no retries.
    async fn fetch_once(&self, package: &str) -> Result<Vec<String>, IndexError> {
        let url = self.project_url(package);
        debug!(%url, "querying package index");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(IndexError::Request)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(IndexError::PackageNotFound(package.to_string()));
        }
        if status.is_server_error() {
            return Err(IndexError::ServerError {
                package: package.to_string(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(IndexError::UnexpectedStatus {
                package: package.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(IndexError::Request)?;
        let project: ProjectResponse = serde_json::from_str(&body)
            .map_err(|e| IndexError::InvalidResponse(e.to_string()))?;

        Ok(listing_from_response(project))
    }
}

#[async_trait]
impl PackageIndex for PypiIndex {
    async fn published_versions(&self, package: &str) -> Result<Vec<String>, IndexError> {
        retry_with_backoff(
            || self.fetch_once(package),
            IndexError::is_transient,
            |e| IndexError::RetriesExhausted(Box::new(e)),
        )
        .await
    }
}

fn listing_from_response(project: ProjectResponse) -> Vec<String> {
    let mut versions: Vec<String> = project.releases.into_keys().collect();

    // info.version is normally one of the release keys; keep it if not.
    if let Some(latest) = project.info.version
        && !latest.is_empty()
        && !versions.contains(&latest)
    {
        versions.push(latest);
    }

    versions
}
