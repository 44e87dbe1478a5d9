//! Placeholder substitution.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::ManifestError;
use crate::version::Version;

use super::{read_file, validate_toml, write_file_atomic};

/// Placeholder the manifest template carries in its version field.
pub const DEFAULT_PLACEHOLDER: &str = "<CURRENT_VERSION>";

/// Result of substituting a placeholder in some text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub content: String,
    pub replacements: usize,
}

/// Replace every occurrence of `token` in `content` with `replacement`.
///
/// Pure string operation: bytes outside the matched tokens are untouched.
pub fn substitute_placeholder(
    content: &str,
    token: &str,
    replacement: &str,
) -> Result<Substitution, ManifestError> {
    if token.is_empty() {
        return Err(ManifestError::EmptyPlaceholder);
    }

    let replacements = content.matches(token).count();
    let content = if replacements == 0 {
        content.to_string()
    } else {
        content.replace(token, replacement)
    };

    Ok(Substitution {
        content,
        replacements,
    })
}

/// Substitute `token` with `version` inside the file at `path`.
///
/// Returns the number of replacements. With zero matches the file is not
/// written at all. TOML manifests are re-parsed before writing; a result that
/// no longer parses is rejected and the file keeps its original content.
pub fn apply_placeholder(path: &Path, token: &str, version: &Version) -> Result<usize, ManifestError> {
    let original = read_file(path)?;
    let substitution = substitute_placeholder(&original, token, &version.to_string())?;

    if substitution.replacements == 0 {
        warn!(path = %path.display(), token, "placeholder not found, manifest left unchanged");
        return Ok(0);
    }

    if is_toml(path) {
        validate_toml(path, &substitution.content)?;
    }

    write_file_atomic(path, &substitution.content)?;
    debug!(
        path = %path.display(),
        replacements = substitution.replacements,
        %version,
        "placeholder substituted"
    );

    Ok(substitution.replacements)
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}
