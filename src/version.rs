//! Version matching for plan gates and dependency updates.
//!
//! Plans state requirements like `>=16.0.0, <17.0.0`; manifests hold npm
//! ranges like `^16.2.0`, which are coerced to their lower bound before
//! matching.

use semver::{Version, VersionReq};
use std::fmt;

/// Errors during version matching
#[derive(Debug, Clone)]
pub enum VersionError {
    /// Invalid version string (e.g., "not-a-version")
    InvalidVersion { value: String, source: String },
    /// Invalid version requirement (e.g., ">=bad")
    InvalidRequirement { value: String, source: String },
}

impl fmt::Display for VersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionError::InvalidVersion { value, source } => {
                write!(f, "invalid version '{}': {}", value, source)
            }
            VersionError::InvalidRequirement { value, source } => {
                write!(f, "invalid version requirement '{}': {}", value, source)
            }
        }
    }
}

impl std::error::Error for VersionError {}

/// Check if a version matches a requirement string
///
/// # Examples
///
/// ```
/// use uplift::version::matches_requirement;
///
/// assert!(matches_requirement("16.2.0", Some(">=16.0.0, <17.0.0")).unwrap());
/// assert!(!matches_requirement("17.0.0", Some(">=16.0.0, <17.0.0")).unwrap());
///
/// // npm ranges are coerced to their lower bound
/// assert!(matches_requirement("^16.1.0", Some("^16")).unwrap());
///
/// // None requirement means "any version"
/// assert!(matches_requirement("1.0.0", None).unwrap());
/// ```
pub fn matches_requirement(version: &str, requirement: Option<&str>) -> Result<bool, VersionError> {
    let Some(req_str) = requirement else {
        return Ok(true);
    };
    let req_str = req_str.trim();
    if req_str.is_empty() {
        return Ok(true);
    }

    let version = coerce_version(version).ok_or_else(|| VersionError::InvalidVersion {
        value: version.to_string(),
        source: "not a semantic version or npm range".to_string(),
    })?;

    let req = VersionReq::parse(req_str).map_err(|e| VersionError::InvalidRequirement {
        value: req_str.to_string(),
        source: e.to_string(),
    })?;

    Ok(req.matches(&version))
}

/// Lower bound of an npm version range: `^16.2` -> `16.2.0`.
///
/// Returns `None` for tags, URLs, wildcards and compound ranges.
pub fn coerce_version(range: &str) -> Option<Version> {
    let trimmed = range
        .trim()
        .trim_start_matches(|c: char| matches!(c, '^' | '~' | '>' | '=' | 'v' | ' '));
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut numbers = [0u64; 3];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part.parse().ok()?;
    }
    Some(Version::new(numbers[0], numbers[1], numbers[2]))
}

/// Whether a manifest range is selected by `from`: equal text, or a
/// requirement its lower bound satisfies.
pub fn range_selected(current: &str, from: &str) -> bool {
    if current.trim() == from.trim() {
        return true;
    }
    matches!(matches_requirement(current, Some(from)), Ok(true))
}
