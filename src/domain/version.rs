use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{BotError, Result};

/// 7.0 or 7.0.1 or 7.0.1.2
const BASE_VERSION_PATTERN: &str = r"(?m)(?P<major_minor>(?P<major>\d+)\.(?P<minor>\d+))(\.((?P<patch>\d+)\.(?P<sweekt>\d+)|(?P<patch_single>\d+)))?";

/// v7.0.1-RC1
const RC_PATTERN: &str = r"-RC(\d+)$";

/// v7.0.1-M1
const MILESTONE_PATTERN: &str = r"-M(\d+)$";

fn base_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BASE_VERSION_PATTERN).expect("base version pattern is valid"))
}

fn rc_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RC_PATTERN).expect("rc pattern is valid"))
}

fn milestone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MILESTONE_PATTERN).expect("milestone pattern is valid"))
}

fn parse_number(value: &str, what: &str) -> Result<u32> {
    value
        .parse::<u32>()
        .map_err(|_| BotError::version(format!("Invalid {} version: {}", what, value)))
}

/// The `version.txt` part of a version: `major.minor[.patch[.sweekt]]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: Option<u32>,
    /// Downstream release counter
    pub sweekt: Option<u32>,
}

impl BaseVersion {
    pub fn new(major: u32, minor: u32, patch: Option<u32>, sweekt: Option<u32>) -> Self {
        BaseVersion {
            major,
            minor,
            patch,
            sweekt,
        }
    }

    /// Parse the first base version found in `content`.
    pub fn parse(content: &str) -> Result<Self> {
        let caps = base_version_regex().captures(content).ok_or_else(|| {
            BotError::version(format!("No base version found in '{}'", content.trim()))
        })?;

        let major = parse_number(&caps["major"], "major")?;
        let minor = parse_number(&caps["minor"], "minor")?;
        let patch = caps
            .name("patch")
            .or_else(|| caps.name("patch_single"))
            .map(|m| parse_number(m.as_str(), "patch"))
            .transpose()?;
        let sweekt = caps
            .name("sweekt")
            .map(|m| parse_number(m.as_str(), "sweekt"))
            .transpose()?;

        Ok(BaseVersion::new(major, minor, patch, sweekt))
    }

    /// Gradle's own version, without the sweekt counter.
    pub fn gradle(&self) -> String {
        match self.patch {
            Some(patch) => format!("{}.{}.{}", self.major, self.minor, patch),
            None => format!("{}.{}", self.major, self.minor),
        }
    }

    /// Normalized `version.txt` content.
    ///
    /// A missing patch is written as `0` when a sweekt counter follows it.
    pub fn to_sweekt(&self) -> String {
        match (self.patch, self.sweekt) {
            (patch, Some(sweekt)) => format!(
                "{}.{}.{}.{}",
                self.major,
                self.minor,
                patch.unwrap_or(0),
                sweekt
            ),
            (Some(patch), None) => format!("{}.{}.{}", self.major, self.minor, patch),
            (None, None) => format!("{}.{}", self.major, self.minor),
        }
    }
}

impl fmt::Display for BaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sweekt())
    }
}

/// Full version of a fork branch: base version plus pre-release numbers
/// taken from the branch name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradleVersion {
    pub base: BaseVersion,
    pub rc_number: Option<u32>,
    pub milestone_number: Option<u32>,
}

impl GradleVersion {
    pub fn new(base: BaseVersion, rc_number: Option<u32>, milestone_number: Option<u32>) -> Self {
        GradleVersion {
            base,
            rc_number,
            milestone_number,
        }
    }

    /// Combine a base version with the RC/milestone numbers of `branch`.
    pub fn for_branch(base: BaseVersion, branch: &str) -> Self {
        GradleVersion::new(base, rc_number(branch), milestone_number(branch))
    }

    fn suffix(&self) -> String {
        match (self.rc_number, self.milestone_number) {
            (Some(rc), _) => format!("-rc-{}", rc),
            (None, Some(milestone)) => format!("-milestone-{}", milestone),
            (None, None) => String::new(),
        }
    }

    /// Gradle base version, e.g. `7.6.1`
    pub fn base_version(&self) -> String {
        self.base.gradle()
    }

    /// Gradle version as published upstream, e.g. `7.6-rc-1`
    pub fn full_version(&self) -> String {
        format!("{}{}", self.base.gradle(), self.suffix())
    }

    /// Fork version, e.g. `7.6.0.3-rc-1`
    pub fn full_sweekt_version(&self) -> String {
        format!("{}{}", self.base.to_sweekt(), self.suffix())
    }

    /// Copy with the sweekt counter replaced.
    pub fn with_sweekt(&self, sweekt: u32) -> Self {
        GradleVersion {
            base: BaseVersion {
                sweekt: Some(sweekt),
                ..self.base
            },
            ..*self
        }
    }
}

fn extract_number(regex: &Regex, branch: &str) -> Option<u32> {
    regex
        .captures(branch)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// RC number from a branch name ending in `-RC<n>`
pub fn rc_number(branch: &str) -> Option<u32> {
    extract_number(rc_regex(), branch)
}

/// Milestone number from a branch name ending in `-M<n>`
pub fn milestone_number(branch: &str) -> Option<u32> {
    extract_number(milestone_regex(), branch)
}
