use std::fmt;

use crate::error::{BotError, Result};

/// The git ref that triggered the workflow (`GITHUB_REF`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerRef {
    Tag(String),
    Branch(String),
    Other(String),
}

impl TriggerRef {
    pub fn parse(reference: &str) -> Self {
        if let Some(tag) = reference.strip_prefix("refs/tags/") {
            TriggerRef::Tag(tag.to_string())
        } else if let Some(branch) = reference.strip_prefix("refs/heads/") {
            TriggerRef::Branch(branch.to_string())
        } else {
            TriggerRef::Other(reference.to_string())
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, TriggerRef::Tag(_))
    }

    /// Name without the `refs/...` prefix
    pub fn short_name(&self) -> &str {
        match self {
            TriggerRef::Tag(name) | TriggerRef::Branch(name) | TriggerRef::Other(name) => name,
        }
    }
}

impl fmt::Display for TriggerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Sweekt counter of a release tag: its trailing number.
///
/// `v9` -> 9, `v7.6.1.9` -> 9
pub fn sweekt_counter(tag: &str) -> Result<u32> {
    let digits: String = tag
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    if digits.is_empty() {
        return Err(BotError::version(format!(
            "Release tag '{}' does not end with a version number",
            tag
        )));
    }

    digits
        .parse::<u32>()
        .map_err(|_| BotError::version(format!("Invalid sweekt version in tag: {}", tag)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag_ref() {
        let r = TriggerRef::parse("refs/tags/v9");
        assert!(r.is_tag());
        assert_eq!(r.short_name(), "v9");
    }

    #[test]
    fn test_parse_branch_ref() {
        let r = TriggerRef::parse("refs/heads/changed/v8.4.0");
        assert!(!r.is_tag());
        assert_eq!(r, TriggerRef::Branch("changed/v8.4.0".to_string()));
    }

    #[test]
    fn test_parse_other_ref() {
        let r = TriggerRef::parse("refs/pull/12/merge");
        assert_eq!(r.short_name(), "refs/pull/12/merge");
        assert!(!r.is_tag());
    }

    #[test]
    fn test_sweekt_counter() {
        assert_eq!(sweekt_counter("v9").unwrap(), 9);
        assert_eq!(sweekt_counter("v7.6.1.9").unwrap(), 9);
        assert_eq!(sweekt_counter("12").unwrap(), 12);
    }

    #[test]
    fn test_sweekt_counter_requires_trailing_number() {
        assert!(sweekt_counter("latest").is_err());
        assert!(sweekt_counter("v1.0-final").is_err());
    }
}
