//! pypi-bump - bump a Python package's version from its latest published release.
//!
//! # Overview
//!
//! pypi-bump asks a package index (PyPI's JSON API, or `pip index versions`)
//! for the latest published version of a package, increments the last
//! numeric segment, writes the result into a manifest template in place of a
//! placeholder token, and optionally runs a build and upload toolchain.

pub mod error;
pub mod index;
pub mod manifest;
pub mod publish;
pub mod release;
pub mod retry;
pub mod version;

// Re-export commonly used types
pub use error::{IndexError, ManifestError, PublishError, ReleaseError, VersionError};
pub use index::{PackageIndex, PipIndex, PypiIndex, fetch_latest};
pub use manifest::{DEFAULT_PLACEHOLDER, apply_placeholder, substitute_placeholder};
pub use publish::{CommandLine, CommandRunner, PublishCommands, PublishStep, SystemRunner};
pub use release::{IndexSource, ReleaseConfig, ReleaseOutcome, ReleasePlan, plan_release, run_release};
pub use version::{Version, next_version};
