//! Helpers for turning raw index listings into versions.

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::debug;

use crate::version::Version;

static NAME_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("separator regex is valid"));

/// Normalize a project name per PEP 503 (`Affinity_Sync` -> `affinity-sync`).
pub fn normalize_package_name(name: &str) -> String {
    NAME_SEPARATORS
        .replace_all(name.trim(), "-")
        .to_lowercase()
}

/// Pick the highest dotted-numeric version from a listing.
///
/// Entries that do not parse (pre-releases, post-releases, local versions)
/// are skipped. Returns `None` when nothing parses.
pub fn select_latest(listed: &[String]) -> Option<Version> {
    listed
        .iter()
        .filter_map(|raw| match Version::parse(raw) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(version = %raw, error = %e, "skipping non-numeric version");
                None
            }
        })
        .max()
}

/// Extract versions from `pip index versions` output.
///
/// pip prints a header line followed by
/// `Available versions: 2.5.7, 2.5.6, ...`. Anything else is ignored.
pub fn parse_pip_listing(output: &str) -> Vec<String> {
    const PREFIX: &str = "Available versions:";

    output
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(PREFIX))
        .map(|rest| {
            rest.split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
