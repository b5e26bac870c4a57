//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git commands the
//! bot issues, allowing the jobs to run against the real `git` binary or a
//! recording mock in tests.
//!
//! # Overview
//!
//! - [shell::ShellGit]: runs `git` through the [crate::exec::Shell] and
//!   reads the current branch with `git2`
//! - [mock::MockGit]: records every operation for assertions
//!
//! No operation retries; callers decide how to handle failures.

pub mod mock;
pub mod shell;

pub use mock::{GitOperation, MockGit};
pub use shell::ShellGit;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Commit message line that stops GitHub Actions from running on a push
pub const SKIP_CI_TRAILER: &str = "[skip ci]";

/// Append the skip-ci trailer to a commit message, once.
pub fn annotate_skip_ci(message: &str) -> String {
    let message = message.trim_end();
    if message.lines().any(|line| line.trim() == SKIP_CI_TRAILER) {
        message.to_string()
    } else {
        format!("{}\n\n{}", message, SKIP_CI_TRAILER)
    }
}

/// Git commands used by the jobs
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync` so services can share one
/// instance behind an `Arc`.
#[async_trait]
pub trait Git: Send + Sync {
    /// Check out an existing branch, tag or commit
    async fn checkout(&self, reference: &str) -> Result<()>;

    /// Create `new_branch` at `start_point` and check it out
    async fn checkout_new_branch(&self, start_point: &str, new_branch: &str) -> Result<()>;

    /// Name of the checked out branch
    ///
    /// # Returns
    /// * `Ok(String)` - Short branch name, e.g. `release/7.6`
    /// * `Err` - If HEAD is detached or the repository cannot be opened
    async fn current_branch(&self) -> Result<String>;

    /// Stage `path` and commit it
    ///
    /// # Arguments
    /// * `path` - File or directory relative to the working directory
    /// * `message` - Commit subject
    /// * `description` - Optional commit body
    async fn commit(&self, path: &Path, message: &str, description: Option<&str>) -> Result<()>;

    /// Push the checked out branch
    ///
    /// When `skip_ci` is set, the last commit message is annotated with
    /// [SKIP_CI_TRAILER] first so the push does not trigger further workflows.
    async fn push(&self, skip_ci: bool) -> Result<()>;

    /// Fetch `source` from `remote` into the local ref `destination`
    ///
    /// # Arguments
    /// * `options` - Extra flags placed before the remote, e.g. `--no-tags`
    async fn fetch(
        &self,
        remote: &str,
        source: &str,
        destination: &str,
        options: &[&str],
    ) -> Result<()>;

    /// Register a remote
    async fn add_remote(&self, name: &str, url: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_skip_ci() {
        assert_eq!(annotate_skip_ci("release: 7.6.1.9\n"), "release: 7.6.1.9\n\n[skip ci]");
    }

    #[test]
    fn test_annotate_skip_ci_is_idempotent() {
        let once = annotate_skip_ci("chore: pin wrapper");
        assert_eq!(annotate_skip_ci(&once), once);
    }
}
