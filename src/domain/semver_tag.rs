use std::cmp::Ordering;
use std::fmt;

use semver::{BuildMetadata, Prerelease, Version};

/// Comparable version of an upstream tag.
///
/// Parsing is lenient: a leading `v` is dropped and missing minor/patch
/// components are filled with zero. Strings that still do not parse
/// compare as the minimum version `0.0.0-0`.
#[derive(Debug, Clone)]
pub struct Semver {
    raw: String,
    version: Version,
}

impl Semver {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let version = parse_lenient(&raw).unwrap_or_else(minimum);
        Semver { raw, version }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The string this version was created from
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

fn minimum() -> Version {
    Version {
        major: 0,
        minor: 0,
        patch: 0,
        pre: Prerelease::new("0").unwrap_or(Prerelease::EMPTY),
        build: BuildMetadata::EMPTY,
    }
}

fn parse_lenient(raw: &str) -> Option<Version> {
    let trimmed = raw.trim().trim_start_matches(['v', 'V']);
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let split = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, rest) = trimmed.split_at(split);
    let parts = core
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let component = |i: usize| parts.get(i).copied().unwrap_or(0);
    Version::parse(&format!(
        "{}.{}.{}{}",
        component(0),
        component(1),
        component(2),
        rest
    ))
    .ok()
}

impl PartialEq for Semver {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for Semver {}

impl PartialOrd for Semver {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Semver {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

impl fmt::Display for Semver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_prefix() {
        assert_eq!(Semver::new("v8.4.0").version(), &Version::new(8, 4, 0));
    }

    #[test]
    fn test_parse_pads_missing_components() {
        assert_eq!(Semver::new("8.4").version(), &Version::new(8, 4, 0));
        assert_eq!(Semver::new("9").version(), &Version::new(9, 0, 0));
        assert_eq!(Semver::new("8.04.1").version(), &Version::new(8, 4, 1));
    }

    #[test]
    fn test_parse_keeps_prerelease() {
        let rc = Semver::new("v8.5-RC1");
        assert_eq!(rc.version().pre.as_str(), "RC1");
        assert!(rc < Semver::new("8.5.0"));
    }

    #[test]
    fn test_invalid_is_minimum() {
        let invalid = Semver::new("nightly");
        assert!(invalid < Semver::new("0.0.0"));
        assert_eq!(invalid, Semver::new("also-invalid"));
        assert_eq!(invalid.raw(), "nightly");
    }

    #[test]
    fn test_ordering_against_floor() {
        let floor = Semver::new("8.3.0");
        assert!(Semver::new("8.4.0") > floor);
        assert!(Semver::new("v8.10.0") > floor);
        assert!(Semver::new("8.3.0") <= floor);
        assert!(Semver::new("v8.3") <= floor);
        assert!(Semver::new("8.2.1") < floor);
    }

    #[test]
    fn test_display() {
        assert_eq!(Semver::new("8.4").to_string(), "v8.4.0");
    }
}
