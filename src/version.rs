//! Semantic version parsing, ordering, and staged bumps
//!
//! Versions in the release index are strict `major.minor.patch` triples:
//! exactly three dot-separated non-negative integers, no pre-release or
//! build metadata. Anything looser is rejected at parse time so that every
//! version string stored in the index stays comparable.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::RelstageError;

/// A semantic version (major.minor.patch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string like "1.2.3"
    ///
    /// Exactly three dot-separated non-negative integers; everything else
    /// fails with [`RelstageError::MalformedVersion`].
    pub fn parse(s: &str) -> Result<Self, RelstageError> {
        let s = s.trim();

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(RelstageError::malformed_version(
                s,
                "expected 'major.minor.patch'",
            ));
        }

        let component = |label: &str, text: &str| -> Result<u64, RelstageError> {
            text.parse::<u64>().map_err(|_| {
                RelstageError::malformed_version(
                    s,
                    format!("{} component '{}' is not a non-negative integer", label, text),
                )
            })
        };

        Ok(Version {
            major: component("major", parts[0])?,
            minor: component("minor", parts[1])?,
            patch: component("patch", parts[2])?,
        })
    }

    /// Whether this version supersedes the current one
    ///
    /// An absent current version is treated as minus-infinity, so any valid
    /// version supersedes it.
    pub fn supersedes(&self, current: Option<&Version>) -> bool {
        match current {
            Some(current) => self > current,
            None => true,
        }
    }

    /// Produce the next version for a staged update
    pub fn bump(&self, kind: UpdateKind) -> Version {
        match kind {
            UpdateKind::Major => Version::new(self.major + 1, 0, 0),
            UpdateKind::Minor => Version::new(self.major, self.minor + 1, 0),
            UpdateKind::Patch => Version::new(self.major, self.minor, self.patch + 1),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.major.cmp(&other.major) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match self.minor.cmp(&other.minor) {
            Ordering::Equal => {}
            ord => return ord,
        }
        self.patch.cmp(&other.patch)
    }
}

/// Kind of version bump applied when staging a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Major,
    Minor,
    Patch,
}

impl FromStr for UpdateKind {
    type Err = RelstageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(UpdateKind::Major),
            "minor" => Ok(UpdateKind::Minor),
            "patch" => Ok(UpdateKind::Patch),
            other => Err(RelstageError::InvalidUpdateKind {
                kind: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateKind::Major => write!(f, "major"),
            UpdateKind::Minor => write!(f, "minor"),
            UpdateKind::Patch => write!(f, "patch"),
        }
    }
}
