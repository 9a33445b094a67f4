//! Semantic version comparison for the `db-version` marker

use crate::migration::MigrationError;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Marker assumed when nothing has been recorded yet
pub const DEFAULT_BASELINE_VERSION: &str = "v0.0.0";

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+)(?:\.(\d+))?(?:\.(\d+))?$").expect("version pattern is valid")
});

/// A `v<major>.<minor>.<patch>` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SchemaVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }

    /// Parse `v?<major>.<minor>.<patch>`
    ///
    /// Trailing components may be omitted and count as `0`, so `v1.0` parses
    /// as `v1.0.0`.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::InvalidVersion` for any other shape, including
    /// components too large for `u64`.
    pub fn parse(input: &str) -> Result<Self, MigrationError> {
        let invalid = || MigrationError::InvalidVersion(input.to_string());
        let caps = VERSION_PATTERN.captures(input).ok_or_else(invalid)?;

        let component = |i: usize| -> Result<u64, MigrationError> {
            match caps.get(i) {
                Some(m) => m.as_str().parse::<u64>().map_err(|_| invalid()),
                None => Ok(0),
            }
        };

        Ok(Self {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
        })
    }
}

impl FromStr for SchemaVersion {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Whether `candidate` is strictly newer than `current`
///
/// Both strings are validated before anything is compared.
///
/// # Errors
///
/// Returns `MigrationError::InvalidVersion` naming the first malformed input.
pub fn is_newer(candidate: &str, current: &str) -> Result<bool, MigrationError> {
    let candidate = SchemaVersion::parse(candidate)?;
    let current = SchemaVersion::parse(current)?;
    Ok(candidate.cmp(&current) == Ordering::Greater)
}
