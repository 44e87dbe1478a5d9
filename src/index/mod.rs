//! Package index queries.
//!
//! Two backends implement [`PackageIndex`]: the PyPI JSON API (default) and
//! the `pip index versions` command.

pub mod listing;
pub mod pip;
pub mod pypi;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::IndexError;
use crate::version::Version;

pub use listing::{normalize_package_name, parse_pip_listing, select_latest};
pub use pip::PipIndex;
pub use pypi::{DEFAULT_INDEX_URL, PypiIndex};

/// Source of published versions for a package.
///
/// This abstraction allows mocking the index in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Every version the index lists for `package`, in index order.
    async fn published_versions(&self, package: &str) -> Result<Vec<String>, IndexError>;
}

/// Fetch the latest dotted-numeric release of `package`.
///
/// Returns `Ok(None)` when the index does not know the package or lists no
/// versions at all. A listing with entries but none usable is an error.
pub async fn fetch_latest<I: PackageIndex + ?Sized>(
    index: &I,
    package: &str,
) -> Result<Option<Version>, IndexError> {
    let listed = match index.published_versions(package).await {
        Ok(listed) => listed,
        Err(IndexError::PackageNotFound(_)) => {
            warn!(package, "package not found on index");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    debug!(package, count = listed.len(), "index listing received");

    if listed.is_empty() {
        return Ok(None);
    }

    select_latest(&listed)
        .map(Some)
        .ok_or_else(|| IndexError::NoUsableVersion {
            package: package.to_string(),
            listed: listed.len(),
        })
}
