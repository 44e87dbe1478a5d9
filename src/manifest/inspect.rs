//! Read project metadata out of pyproject.toml (PEP 621 + Poetry).

use std::path::Path;

use toml_edit::DocumentMut;

use crate::error::ManifestError;

use super::{parse_toml, read_file};

/// The project name from `[project].name`, falling back to `[tool.poetry].name`.
pub fn read_project_name(path: &Path) -> Result<String, ManifestError> {
    let doc = load(path)?;
    project_str(&doc, "name")
        .filter(|name| !name.trim().is_empty())
        .map(|name| name.trim().to_string())
        .ok_or_else(|| ManifestError::NoProjectName(path.to_path_buf()))
}

/// The raw version field, if any. May still be the placeholder.
pub fn read_version_field(path: &Path) -> Result<Option<String>, ManifestError> {
    let doc = load(path)?;
    Ok(project_str(&doc, "version").map(String::from))
}

fn load(path: &Path) -> Result<DocumentMut, ManifestError> {
    let content = read_file(path)?;
    parse_toml(path, &content)
}

fn project_str<'a>(doc: &'a DocumentMut, key: &str) -> Option<&'a str> {
    // PEP 621: [project].<key>
    doc.get("project")
        .and_then(|p| p.get(key))
        .and_then(|v| v.as_str())
        // Poetry fallback: [tool.poetry].<key>
        .or_else(|| {
            doc.get("tool")
                .and_then(|t| t.get("poetry"))
                .and_then(|p| p.get(key))
                .and_then(|v| v.as_str())
        })
}
