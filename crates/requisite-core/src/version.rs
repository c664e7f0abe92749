//! Dotted-numeric version strings and their ordering.
//!
//! Platform, framework and extension versions are plain dotted numbers of any
//! length (`3.9`, `4.0.1`, `1.2.3.4`). Segments are compared left to right and
//! missing trailing segments count as `0`, so `1.0` and `1.0.0` are equal.
//!
//! # Examples
//!
//! ```
//! use requisite_core::Version;
//!
//! let old: Version = "3.8".parse().unwrap();
//! let new: Version = "3.10".parse().unwrap();
//! assert!(old < new);
//! assert_eq!("1.0".parse::<Version>().unwrap(), "1.0.0".parse::<Version>().unwrap());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A parsed dotted-numeric version.
///
/// The original text is kept for display so that `"3.9"` is reported back as
/// written rather than as `"3.9.0"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    segments: Vec<u64>,
    raw: String,
}

impl Version {
    /// Parse a version string such as `"3.9"` or `"1.2.3.4"`.
    pub fn parse(version: &str) -> Result<Self> {
        let trimmed = version.trim();
        if trimmed.is_empty() {
            return Err(invalid(version, "empty version"));
        }

        let segments = trimmed
            .split('.')
            .map(|segment| parse_segment(version, segment))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            segments,
            raw: trimmed.to_string(),
        })
    }

    /// Build a version from numeric segments.
    pub fn from_segments(segments: &[u64]) -> Self {
        let raw = segments
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Self {
            segments: segments.to_vec(),
            raw,
        }
    }

    /// Numeric segments as written.
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// The version text as written (trimmed).
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn parse_segment(version: &str, segment: &str) -> Result<u64> {
    if segment.is_empty() {
        return Err(invalid(version, "empty segment"));
    }
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(
            version,
            &format!("segment '{segment}' is not a number"),
        ));
    }
    segment
        .parse()
        .map_err(|_| invalid(version, &format!("segment '{segment}' is out of range")))
}

fn invalid(version: &str, reason: &str) -> Error {
    Error::InvalidVersion {
        version: version.to_string(),
        reason: reason.to_string(),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| {
                let a = self.segments.get(i).copied().unwrap_or(0);
                let b = other.segments.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Version {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.raw
    }
}

/// Pre-release and build metadata are dropped; only `major.minor.patch` is kept.
impl From<&semver::Version> for Version {
    fn from(version: &semver::Version) -> Self {
        Self::from_segments(&[version.major, version.minor, version.patch])
    }
}

impl From<semver::Version> for Version {
    fn from(version: semver::Version) -> Self {
        Self::from(&version)
    }
}
