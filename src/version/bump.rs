//! Next-version calculation from the latest published release.

use crate::error::VersionError;

use super::Version;

/// Calculate the version to publish next.
///
/// - A published release bumps its last segment (`1.2.3` -> `1.2.4`)
/// - No release but an initial version configured: use it as-is
/// - Neither: `VersionError::NoBaseVersion`
pub fn next_version(
    latest: Option<&Version>,
    initial: Option<&Version>,
) -> Result<Version, VersionError> {
    match (latest, initial) {
        (Some(latest), _) => latest.bump_last(),
        (None, Some(initial)) => Ok(initial.clone()),
        (None, None) => Err(VersionError::NoBaseVersion),
    }
}

/// Parse a version string and bump its last segment.
pub fn bump_version_str(input: &str) -> Result<String, VersionError> {
    Ok(Version::parse(input)?.bump_last()?.to_string())
}
