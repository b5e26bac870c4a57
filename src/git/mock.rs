use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{BotError, Result};
use crate::git::Git;

/// An operation recorded by [MockGit]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOperation {
    Checkout(String),
    CheckoutNewBranch {
        start_point: String,
        new_branch: String,
    },
    Commit {
        path: PathBuf,
        message: String,
        description: Option<String>,
    },
    Push {
        branch: String,
        skip_ci: bool,
    },
    Fetch {
        remote: String,
        source: String,
        destination: String,
        options: Vec<String>,
    },
    AddRemote {
        name: String,
        url: String,
    },
}

/// Mock git for testing without a repository.
///
/// Records operations, tracks the current branch, and can simulate a
/// working tree by writing files when a branch is checked out.
#[derive(Debug, Clone)]
pub struct MockGit {
    inner: Arc<Mutex<MockGitInner>>,
}

#[derive(Debug)]
struct MockGitInner {
    workdir: PathBuf,
    current_branch: String,
    branch_files: HashMap<String, Vec<(PathBuf, String)>>,
    operations: Vec<GitOperation>,
    fail_on_push: bool,
}

impl MockGitInner {
    fn write_branch_files(&self, branch: &str) -> Result<()> {
        for (path, content) in self.branch_files.get(branch).into_iter().flatten() {
            let path = self.workdir.join(path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        Ok(())
    }
}

impl MockGit {
    /// Create a mock whose checkouts write into `workdir`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        MockGit {
            inner: Arc::new(Mutex::new(MockGitInner {
                workdir: workdir.into(),
                current_branch: "main".to_string(),
                branch_files: HashMap::new(),
                operations: Vec::new(),
                fail_on_push: false,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockGitInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Set the branch reported by `current_branch`
    pub fn set_current_branch(&self, branch: impl Into<String>) {
        self.lock().current_branch = branch.into();
    }

    /// Write `content` to `path` whenever `branch` is checked out or created
    pub fn with_branch_file(
        self,
        branch: impl Into<String>,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Self {
        self.lock()
            .branch_files
            .entry(branch.into())
            .or_default()
            .push((path.into(), content.into()));
        self
    }

    /// Make every push fail
    pub fn fail_on_push(self) -> Self {
        self.lock().fail_on_push = true;
        self
    }

    /// All recorded operations, in order
    pub fn operations(&self) -> Vec<GitOperation> {
        self.lock().operations.clone()
    }

    fn record(&self, operation: GitOperation) {
        self.lock().operations.push(operation);
    }
}

#[async_trait]
impl Git for MockGit {
    async fn checkout(&self, reference: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.write_branch_files(reference)?;
        inner.current_branch = reference.to_string();
        inner
            .operations
            .push(GitOperation::Checkout(reference.to_string()));
        Ok(())
    }

    async fn checkout_new_branch(&self, start_point: &str, new_branch: &str) -> Result<()> {
        let mut inner = self.lock();
        inner.write_branch_files(new_branch)?;
        inner.current_branch = new_branch.to_string();
        inner.operations.push(GitOperation::CheckoutNewBranch {
            start_point: start_point.to_string(),
            new_branch: new_branch.to_string(),
        });
        Ok(())
    }

    async fn current_branch(&self) -> Result<String> {
        Ok(self.lock().current_branch.clone())
    }

    async fn commit(&self, path: &Path, message: &str, description: Option<&str>) -> Result<()> {
        self.record(GitOperation::Commit {
            path: path.to_path_buf(),
            message: message.to_string(),
            description: description.map(str::to_string),
        });
        Ok(())
    }

    async fn push(&self, skip_ci: bool) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_on_push {
            return Err(BotError::precondition("push rejected by mock"));
        }
        let branch = inner.current_branch.clone();
        inner.operations.push(GitOperation::Push { branch, skip_ci });
        Ok(())
    }

    async fn fetch(
        &self,
        remote: &str,
        source: &str,
        destination: &str,
        options: &[&str],
    ) -> Result<()> {
        self.record(GitOperation::Fetch {
            remote: remote.to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        });
        Ok(())
    }

    async fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.record(GitOperation::AddRemote {
            name: name.to_string(),
            url: url.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_checkout_writes_branch_files() {
        let dir = tempfile::tempdir().unwrap();
        let git = MockGit::new(dir.path()).with_branch_file("release/7.6", "version.txt", "7.6.1.3");

        git.checkout("release/7.6").await.unwrap();

        assert_eq!(git.current_branch().await.unwrap(), "release/7.6");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("version.txt")).unwrap(),
            "7.6.1.3"
        );
    }

    #[tokio::test]
    async fn test_push_records_current_branch() {
        let dir = tempfile::tempdir().unwrap();
        let git = MockGit::new(dir.path());

        git.checkout_new_branch("tags/fetched-v8.4.0", "upstream/v8.4.0")
            .await
            .unwrap();
        git.push(false).await.unwrap();

        assert_eq!(
            git.operations().last(),
            Some(&GitOperation::Push {
                branch: "upstream/v8.4.0".to_string(),
                skip_ci: false,
            })
        );
    }

    #[tokio::test]
    async fn test_fail_on_push() {
        let dir = tempfile::tempdir().unwrap();
        let git = MockGit::new(dir.path()).fail_on_push();
        assert!(git.push(true).await.is_err());
        assert!(git.operations().is_empty());
    }
}
