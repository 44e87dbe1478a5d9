//! Manifest template handling: placeholder substitution, metadata reads,
//! and snapshot/restore of the original template.

pub mod inspect;
pub mod placeholder;

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::ManifestError;

pub use inspect::{read_project_name, read_version_field};
pub use placeholder::{DEFAULT_PLACEHOLDER, Substitution, apply_placeholder, substitute_placeholder};

/// Original manifest content, captured so it can be written back later.
#[derive(Debug, Clone)]
pub struct ManifestSnapshot {
    path: PathBuf,
    original: String,
}

impl ManifestSnapshot {
    pub fn capture(path: &Path) -> Result<Self, ManifestError> {
        Ok(Self {
            path: path.to_path_buf(),
            original: read_file(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the captured content back. Skips the write if nothing changed.
    pub fn restore(&self) -> Result<(), ManifestError> {
        if read_file(&self.path).is_ok_and(|current| current == self.original) {
            return Ok(());
        }
        write_file_atomic(&self.path, &self.original)
    }
}

// --- Shared helpers ---

pub(crate) fn parse_toml(path: &Path, content: &str) -> Result<toml_edit::DocumentMut, ManifestError> {
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| ManifestError::InvalidToml {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

pub(crate) fn validate_toml(path: &Path, content: &str) -> Result<(), ManifestError> {
    parse_toml(path, content).map(|_| ())
}

pub(crate) fn read_file(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|source| ManifestError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Write through a temp file in the same directory, then rename over `path`.
///
/// The original file's permissions are carried over.
pub(crate) fn write_file_atomic(path: &Path, content: &str) -> Result<(), ManifestError> {
    let write_err = |source: std::io::Error| ManifestError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    if let Ok(metadata) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(write_err)?;
    }

    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
