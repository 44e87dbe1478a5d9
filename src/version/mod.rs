//! Version parsing and last-segment bumping.

pub mod bump;
pub mod dotted;

pub use bump::{bump_version_str, next_version};
pub use dotted::Version;
