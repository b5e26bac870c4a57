use async_trait::async_trait;

use super::{Branch, Release, RepositoryService, Tag};
use crate::context::RepositoryContext;
use crate::error::Result;

/// In-memory repository for deterministic tests
#[derive(Debug, Clone)]
pub struct MockRepository {
    context: RepositoryContext,
    tags: Vec<Tag>,
    branches: Vec<Branch>,
    latest_release: Option<Release>,
}

impl MockRepository {
    /// Create an empty repository named `owner/name`
    pub fn new(repository: impl Into<String>) -> Self {
        MockRepository {
            context: RepositoryContext::new(repository),
            tags: Vec::new(),
            branches: Vec::new(),
            latest_release: None,
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags
            .iter()
            .map(|name| Tag {
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn with_branches(mut self, branches: &[&str]) -> Self {
        self.branches = branches
            .iter()
            .map(|name| Branch {
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn with_latest_release(mut self, tag_name: impl Into<String>) -> Self {
        self.latest_release = Some(Release {
            tag_name: tag_name.into(),
            name: None,
            prerelease: false,
        });
        self
    }
}

#[async_trait]
impl RepositoryService for MockRepository {
    fn context(&self) -> &RepositoryContext {
        &self.context
    }

    async fn tags(&self) -> Result<Vec<Tag>> {
        Ok(self.tags.clone())
    }

    async fn branches(&self) -> Result<Vec<Branch>> {
        Ok(self.branches.clone())
    }

    async fn latest_release(&self) -> Result<Option<Release>> {
        Ok(self.latest_release.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_repository_default() {
        let repo = MockRepository::new("gradle/gradle");
        assert!(repo.tags().await.unwrap().is_empty());
        assert!(repo.latest_release().await.unwrap().is_none());
        assert_eq!(repo.context().repository, "gradle/gradle");
    }

    #[tokio::test]
    async fn test_mock_repository_preserves_order() {
        let repo = MockRepository::new("a/b").with_tags(&["v8.5.0", "v8.4.0"]);
        let names: Vec<String> = repo.tags().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["v8.5.0", "v8.4.0"]);
    }
}
