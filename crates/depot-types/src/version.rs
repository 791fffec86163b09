use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Wall-clock format behind every version identifier.
const VERSION_FORMAT: &str = "%Y%m%d%H%M%S";

/// Number of digits in a version identifier.
pub const VERSION_LEN: usize = 14;

/// A version identifier naming one artifact-set generation.
///
/// A version is a fixed-width 14-digit decimal string, `YYYYMMDDHHMMSS`,
/// derived from wall-clock time at allocation. The fixed width and zero
/// padding guarantee that lexicographic order equals chronological order,
/// so "latest" is simply the maximum string.
///
/// Resolution is one second. Two allocations within the same second produce
/// the same version and share its namespace; the versioning layer neither
/// detects nor serializes this (see the concurrency notes on
/// `depot-store`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Allocate a version from the current wall-clock time.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Format an explicit timestamp as a version.
    ///
    /// Pure counterpart of [`Version::now`], used by tests and by callers
    /// that pin the allocation instant.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.format(VERSION_FORMAT).to_string())
    }

    /// Parse a version from a directory or key segment.
    ///
    /// Accepts exactly 14 ASCII digits that decode to a real calendar
    /// timestamp. Anything else is malformed; enumeration code skips
    /// malformed segments rather than failing the scan.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.len() != VERSION_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::MalformedVersion(s.to_string()));
        }
        NaiveDateTime::parse_from_str(s, VERSION_FORMAT)
            .map_err(|_| TypeError::MalformedVersion(s.to_string()))?;
        Ok(Self(s.to_string()))
    }

    /// The version as its 14-digit string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Version {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({})", self.0)
    }
}

/// Select the newest version from an enumeration.
///
/// This is the backend-agnostic half of latest resolution: both backends
/// enumerate candidate versions their own way and delegate the decision
/// here. Returns `None` when no valid version was discovered.
pub fn latest<I>(versions: I) -> Option<Version>
where
    I: IntoIterator<Item = Version>,
{
    versions.into_iter().max()
}
