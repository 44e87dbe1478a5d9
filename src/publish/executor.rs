//! Build and upload command execution.
//!
//! Commands run through `tokio::process::Command` with inherited stdout and
//! stderr, so the build tool's own progress output reaches the user.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use globset::Glob;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::PublishError;

/// Default build command (PyPA `build` frontend).
pub const DEFAULT_BUILD_COMMAND: &str = "python -m build";

/// Default upload command.
pub const DEFAULT_UPLOAD_COMMAND: &str = "twine upload dist/*";

/// Which publish stage a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    Build,
    Upload,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishStep::Build => write!(f, "build"),
            PublishStep::Upload => write!(f, "upload"),
        }
    }
}

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split a command line on whitespace. No shell quoting is interpreted.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Trait for running publish commands.
///
/// This abstraction allows mocking the subprocesses in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` in `cwd` and wait for it to finish successfully.
    async fn run(&self, step: PublishStep, command: &CommandLine, cwd: &Path) -> Result<(), PublishError>;
}

/// Runner that spawns real processes.
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, step: PublishStep, command: &CommandLine, cwd: &Path) -> Result<(), PublishError> {
        if command.program.is_empty() {
            return Err(PublishError::EmptyCommand { step });
        }
        if which::which(&command.program).is_err() {
            return Err(PublishError::ToolNotInstalled(command.program.clone()));
        }

        let mut args = Vec::with_capacity(command.args.len());
        for arg in &command.args {
            args.extend(expand_glob(cwd, arg)?);
        }

        debug!(%step, program = %command.program, ?args, cwd = %cwd.display(), "running publish command");

        let status = timeout(
            self.timeout,
            Command::new(&command.program)
                .args(&args)
                .current_dir(cwd)
                .stdin(Stdio::null())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .kill_on_drop(true)
                .status(),
        )
        .await
        .map_err(|_| PublishError::Timeout {
            step,
            secs: self.timeout.as_secs(),
        })?
        .map_err(|source| PublishError::SpawnFailed { step, source })?;

        if !status.success() {
            return Err(PublishError::NonZeroExit {
                step,
                code: status.code(),
            });
        }

        Ok(())
    }
}

/// Whether `arg` is a path pattern to expand.
///
/// Flags (`--repository-url=...?x`) and URLs pass through even when they
/// contain wildcard characters.
fn is_path_pattern(arg: &str) -> bool {
    !arg.starts_with('-') && !arg.contains("://") && arg.contains(['*', '?', '['])
}

/// Files under `cwd` matching `pattern`, as the path the user wrote.
///
/// Only the final path component may contain wildcards. A missing directory
/// yields no matches.
fn matching_files(cwd: &Path, pattern: &str) -> Result<Vec<PathBuf>, PublishError> {
    let pattern_path = Path::new(pattern);
    let file_pattern = pattern_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PublishError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: "pattern has no file name component".into(),
        })?;
    let parent = pattern_path.parent().unwrap_or_else(|| Path::new(""));

    let matcher = Glob::new(file_pattern)
        .map_err(|e| PublishError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?
        .compile_matcher();

    let Ok(entries) = std::fs::read_dir(cwd.join(parent)) else {
        return Ok(Vec::new());
    };

    let mut matches: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter(|entry| matcher.is_match(entry.file_name()))
        .map(|entry| parent.join(entry.file_name()))
        .collect();
    matches.sort();
    Ok(matches)
}

/// Expand a `dir/*.ext` style argument relative to `cwd`.
///
/// Arguments that are not path patterns pass through untouched. Matches come
/// back sorted, as the path the user wrote (`dist/a.whl`), not absolute.
pub fn expand_glob(cwd: &Path, arg: &str) -> Result<Vec<String>, PublishError> {
    if !is_path_pattern(arg) {
        return Ok(vec![arg.to_string()]);
    }

    let matches = matching_files(cwd, arg)?;
    if matches.is_empty() {
        return Err(PublishError::NoArtifacts(arg.to_string()));
    }

    Ok(matches
        .into_iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect())
}

/// Delete files the upload command's patterns would pick up.
///
/// Runs before the build so `dist/*` only sees this build's artifacts.
/// Returns the removed paths.
pub fn clear_stale_artifacts(upload: &CommandLine, cwd: &Path) -> Result<Vec<PathBuf>, PublishError> {
    let mut removed = Vec::new();
    for arg in upload.args.iter().filter(|a| is_path_pattern(a)) {
        for relative in matching_files(cwd, arg)? {
            let path = cwd.join(&relative);
            std::fs::remove_file(&path).map_err(|source| PublishError::CleanFailed {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "removed stale artifact");
            removed.push(relative);
        }
    }
    Ok(removed)
}
