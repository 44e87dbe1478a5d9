//! Dotted numeric version identifiers (`1.2.3`, `0.9`, `2024.1.15.3`).

use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;

/// A version made of one or more dot-separated integer segments.
///
/// Ordering is segment-wise numeric; when one version is a prefix of the
/// other, the shorter one sorts first (`1.2 < 1.2.0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    segments: Vec<u64>,
}

impl Version {
    /// Build a version from raw segments. Fails on an empty list.
    pub fn from_segments(segments: Vec<u64>) -> Result<Self, VersionError> {
        if segments.is_empty() {
            return Err(VersionError::Empty);
        }
        Ok(Self { segments })
    }

    /// Parse a dotted numeric string.
    ///
    /// Surrounding whitespace is ignored. Every segment must be a run of
    /// ASCII digits, so PEP 440 suffixes (`rc1`, `.post1`, `+local`) and a
    /// leading `v` are rejected.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let mut segments = Vec::new();
        for segment in trimmed.split('.') {
            if segment.is_empty() {
                return Err(VersionError::EmptySegment {
                    input: trimmed.to_string(),
                });
            }
            if !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionError::NonNumericSegment {
                    input: trimmed.to_string(),
                    segment: segment.to_string(),
                });
            }
            let value = segment
                .parse::<u64>()
                .map_err(|_| VersionError::SegmentOverflow {
                    input: trimmed.to_string(),
                    segment: segment.to_string(),
                })?;
            segments.push(value);
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// Increment the final segment by one, keeping all others.
    pub fn bump_last(&self) -> Result<Version, VersionError> {
        let mut segments = self.segments.clone();
        // from_segments/parse guarantee at least one segment
        let last = segments
            .last_mut()
            .ok_or(VersionError::Empty)?;
        *last = last
            .checked_add(1)
            .ok_or_else(|| VersionError::BumpOverflow(self.to_string()))?;
        Ok(Version { segments })
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}
