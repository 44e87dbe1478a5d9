//! `pip index versions` backend.
//!
//! Shells out to pip and filters its human-readable listing, the same way a
//! release script would with `pip index versions <pkg> | grep ...`.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::error::IndexError;

use super::PackageIndex;
use super::listing::parse_pip_listing;

/// Default pip executable.
pub const DEFAULT_PIP_PROGRAM: &str = "pip";

/// Queries an index through the pip CLI.
pub struct PipIndex {
    program: String,
    index_url: Option<String>,
    timeout: Duration,
}

impl PipIndex {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: DEFAULT_PIP_PROGRAM.to_string(),
            index_url: None,
            timeout,
        }
    }

    /// Use another pip executable (e.g. `pip3`, or a venv path).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Pass `--index-url` to pip. Must point at a simple (PEP 503) index.
    pub fn with_index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = Some(url.into());
        self
    }

    fn args(&self, package: &str) -> Vec<String> {
        let mut args = vec![
            "index".to_string(),
            "versions".to_string(),
            package.to_string(),
        ];
        if let Some(url) = &self.index_url {
            args.push("--index-url".to_string());
            args.push(url.clone());
        }
        args
    }
}

#[async_trait]
impl PackageIndex for PipIndex {
    async fn published_versions(&self, package: &str) -> Result<Vec<String>, IndexError> {
        if which::which(&self.program).is_err() {
            return Err(IndexError::ToolNotInstalled(self.program.clone()));
        }

        let args = self.args(package);
        debug!(program = %self.program, ?args, "querying index via pip");

        let output = timeout(
            self.timeout,
            Command::new(&self.program)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| IndexError::Timeout(self.timeout.as_secs()))?
        .map_err(IndexError::SpawnFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.contains("No matching distribution found") {
                return Err(IndexError::PackageNotFound(package.to_string()));
            }
            return Err(IndexError::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_pip_listing(&stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_without_index_url() {
        let pip = PipIndex::new(Duration::from_secs(5));
        assert_eq!(pip.args("affinity-sync"), vec!["index", "versions", "affinity-sync"]);
    }

    #[test]
    fn test_args_with_index_url() {
        let pip = PipIndex::new(Duration::from_secs(5)).with_index_url("https://test.pypi.org/simple/");
        assert_eq!(
            pip.args("pkg"),
            vec!["index", "versions", "pkg", "--index-url", "https://test.pypi.org/simple/"]
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let pip = PipIndex::new(Duration::from_secs(5)).with_program("definitely-not-a-real-pip-binary");
        let result = pip.published_versions("pkg").await;
        assert!(matches!(result, Err(IndexError::ToolNotInstalled(p)) if p == "definitely-not-a-real-pip-binary"));
    }

    /// A stand-in pip that prints a canned listing.
    #[tokio::test]
    #[cfg(unix)]
    async fn test_listing_from_fake_pip() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-pip");
        std::fs::write(
            &script,
            "#!/bin/sh\necho \"$3 (2.5.7)\"\necho \"Available versions: 2.5.7, 2.5.6\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let pip = PipIndex::new(Duration::from_secs(10)).with_program(script.to_str().unwrap());
        let versions = pip.published_versions("affinity-sync").await.unwrap();
        assert_eq!(versions, vec!["2.5.7", "2.5.6"]);
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_fake_pip_not_found() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-pip");
        std::fs::write(
            &script,
            "#!/bin/sh\necho \"ERROR: No matching distribution found for $3\" >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let pip = PipIndex::new(Duration::from_secs(10)).with_program(script.to_str().unwrap());
        let result = pip.published_versions("ghost").await;
        assert!(matches!(result, Err(IndexError::PackageNotFound(p)) if p == "ghost"));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_fake_pip_other_failure() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-pip");
        std::fs::write(
            &script,
            "#!/bin/sh\necho \"ERROR: Could not fetch URL: connection refused\" >&2\nexit 2\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let pip = PipIndex::new(Duration::from_secs(10)).with_program(script.to_str().unwrap());
        let result = pip.published_versions("pkg").await;
        match result {
            Err(IndexError::CommandFailed { code, stderr }) => {
                assert_eq!(code, 2);
                assert!(stderr.contains("connection refused"));
            }
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_fake_pip_timeout() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-pip");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 5\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let pip = PipIndex::new(Duration::from_millis(200)).with_program(script.to_str().unwrap());
        let result = pip.published_versions("pkg").await;
        assert!(matches!(result, Err(IndexError::Timeout(_))));
    }
}
