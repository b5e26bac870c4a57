//! Hosted repository queries (tags, branches, releases).
//!
//! Jobs depend on [RepositoryService]; one instance serves the current
//! repository and another, built from the same context with a different
//! `owner/name`, serves upstream.

pub mod github;
pub mod mock;

pub use github::GithubRepository;
pub use mock::MockRepository;

use async_trait::async_trait;
use serde::Deserialize;

use crate::context::RepositoryContext;
use crate::error::Result;

/// A tag as listed by the forge
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// A branch as listed by the forge
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Branch {
    pub name: String,
}

/// A published release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
}

/// Read-only queries against a hosted repository
#[async_trait]
pub trait RepositoryService: Send + Sync {
    /// Repository this service queries
    fn context(&self) -> &RepositoryContext;

    /// All tags, newest first as the forge returns them
    async fn tags(&self) -> Result<Vec<Tag>>;

    /// All branches
    async fn branches(&self) -> Result<Vec<Branch>>;

    /// The latest published release, or `None` if nothing was released yet
    async fn latest_release(&self) -> Result<Option<Release>>;
}
