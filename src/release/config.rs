//! Release configuration, derived from CLI flags and the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::error::IndexError;
use crate::index::{PackageIndex, PipIndex, PypiIndex};
use crate::manifest::DEFAULT_PLACEHOLDER;
use crate::publish::PublishCommands;
use crate::version::Version;

/// Default timeout for build, upload and pip subprocesses (10 minutes).
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 600;

/// Environment variable to override the default command timeout.
pub const TIMEOUT_ENV_VAR: &str = "PYPI_BUMP_COMMAND_TIMEOUT";

/// Default manifest path, relative to the working directory.
pub const DEFAULT_MANIFEST: &str = "pyproject.toml";

/// Get the configured subprocess timeout.
///
/// Reads from PYPI_BUMP_COMMAND_TIMEOUT if set, otherwise uses the default
/// of 600 seconds. Logs a warning if the variable is set but invalid.
pub fn command_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_COMMAND_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
    }
}

/// Where published versions are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum IndexSource {
    /// PyPI JSON API over HTTPS
    #[default]
    Pypi,
    /// `pip index versions`
    Pip,
}

/// Configuration for one release run.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Package to look up. Defaults to the manifest's project name.
    pub package: Option<String>,
    pub manifest: PathBuf,
    pub placeholder: String,
    pub source: IndexSource,
    /// Index URL override. JSON API base for `pypi`, simple index for `pip`.
    pub index_url: Option<String>,
    /// Version to use when the package has never been published.
    pub initial_version: Option<Version>,
    pub dry_run: bool,
    /// Write the original template back once the run ends.
    pub restore: bool,
    /// Build and upload after substituting. `None` stops after the bump.
    pub publish: Option<PublishCommands>,
    /// Skip the confirmation prompt before publishing.
    pub assume_yes: bool,
    pub command_timeout: Duration,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            package: None,
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            source: IndexSource::default(),
            index_url: None,
            initial_version: None,
            dry_run: false,
            restore: false,
            publish: None,
            assume_yes: false,
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }
}

impl ReleaseConfig {
    /// Build the index backend this configuration selects.
    pub fn build_index(&self) -> Result<Box<dyn PackageIndex>, IndexError> {
        match self.source {
            IndexSource::Pypi => Ok(Box::new(match &self.index_url {
                Some(url) => PypiIndex::with_base_url(url.clone())?,
                None => PypiIndex::new()?,
            })),
            IndexSource::Pip => {
                let pip = PipIndex::new(self.command_timeout);
                Ok(Box::new(match &self.index_url {
                    Some(url) => pip.with_index_url(url.clone()),
                    None => pip,
                }))
            }
        }
    }
}
