//! Error types for pypi-bump modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

use crate::publish::PublishStep;

/// Errors from version parsing and bumping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Version string is empty")]
    Empty,

    #[error("Version '{input}' has an empty segment")]
    EmptySegment { input: String },

    #[error("Version '{input}' has non-numeric segment '{segment}'")]
    NonNumericSegment { input: String, segment: String },

    #[error("Segment '{segment}' of version '{input}' does not fit in 64 bits")]
    SegmentOverflow { input: String, segment: String },

    #[error("Cannot bump {0}: last segment would overflow")]
    BumpOverflow(String),

    #[error("No version found to bump from")]
    NoBaseVersion,
}

/// Errors from package index queries.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Package '{0}' was not found on the index")]
    PackageNotFound(String),

    #[error("Index returned server error {status} for '{package}'")]
    ServerError { package: String, status: u16 },

    #[error("Index returned unexpected status {status} for '{package}'")]
    UnexpectedStatus { package: String, status: u16 },

    #[error("Failed to reach package index: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Index returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error(
        "Package '{package}' lists {listed} version(s) but none is dotted-numeric (e.g. 1.2.3)"
    )]
    NoUsableVersion { package: String, listed: usize },

    #[error("'{0}' not found on PATH")]
    ToolNotInstalled(String),

    #[error("Failed to spawn index query command: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("Index query command exited with code {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("Index query timed out after {0} seconds")]
    Timeout(u64),

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<IndexError>),
}

impl IndexError {
    /// Whether another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            IndexError::ServerError { .. } | IndexError::Timeout(_) => true,
            IndexError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

/// Errors from manifest reading and rewriting.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Placeholder token must not be empty")]
    EmptyPlaceholder,

    #[error("{path} is not valid TOML: {reason}")]
    InvalidToml { path: PathBuf, reason: String },

    #[error("No project name in [project] or [tool.poetry] of {0}. Pass --package explicitly.")]
    NoProjectName(PathBuf),
}

/// Errors from the build and upload steps.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("{step} command is empty")]
    EmptyCommand { step: PublishStep },

    #[error("'{0}' not found on PATH")]
    ToolNotInstalled(String),

    #[error("Failed to spawn {step} command: {source}")]
    SpawnFailed {
        step: PublishStep,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} command exited with {}", code.map_or("a signal".to_string(), |c| format!("code {c}")))]
    NonZeroExit { step: PublishStep, code: Option<i32> },

    #[error("{step} command timed out after {secs} seconds")]
    Timeout { step: PublishStep, secs: u64 },

    #[error("Invalid artifact pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Failed to remove stale artifact {path}: {source}")]
    CleanFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No artifacts match '{0}'")]
    NoArtifacts(String),
}

/// Errors from the release pipeline.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error(
        "'{0}' has no published versions. Pass --initial-version to publish it for the first time."
    )]
    NoPublishedVersions(String),

    #[error("Release cancelled")]
    Cancelled,
}
