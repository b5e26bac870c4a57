use std::sync::Arc;

use async_trait::async_trait;

use super::{Job, JobInput, JobOutcome};
use crate::domain::{sweekt_counter, BranchState, GradleVersion, TrackedBranch, TriggerRef};
use crate::error::{BotError, Result};
use crate::forge::RepositoryService;
use crate::git::Git;
use crate::gradle::GradleService;

/// What happened to a single branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BumpResult {
    /// `version.txt` was rewritten, committed and pushed
    Bumped(GradleVersion),
    /// The branch already carries the release's counter
    Unchanged,
}

/// Keeps the sweekt counter of fork branches in step with releases.
///
/// Triggered either by a new release (the trigger ref is its tag, every
/// `changed/*` branch is bumped) or by pushed branches (each is bumped to
/// the latest release).
pub struct BumpVersionFileJob {
    git: Arc<dyn Git>,
    gradle: GradleService,
    repo: Arc<dyn RepositoryService>,
    trigger_ref: TriggerRef,
}

impl BumpVersionFileJob {
    pub fn new(
        git: Arc<dyn Git>,
        gradle: GradleService,
        repo: Arc<dyn RepositoryService>,
        trigger_ref: TriggerRef,
    ) -> Self {
        BumpVersionFileJob {
            git,
            gradle,
            repo,
            trigger_ref,
        }
    }

    async fn changed_branches(&self) -> Result<Vec<String>> {
        Ok(self
            .repo
            .branches()
            .await?
            .into_iter()
            .filter(|branch| {
                TrackedBranch::parse(&branch.name)
                    .is_some_and(|tracked| tracked.state == BranchState::Changed)
            })
            .map(|branch| branch.name)
            .collect())
    }

    /// Align `branch` with the counter of `tag`.
    pub async fn bump_version(&self, branch: &str, tag: &str) -> Result<BumpResult> {
        let version = self.gradle.calculate_version(Some(branch)).await?;
        let counter = sweekt_counter(tag)?;

        if version.base.sweekt == Some(counter) {
            tracing::info!("🎉 Current Sweekt version is consistent with latest release");
            return Ok(BumpResult::Unchanged);
        }

        let bumped = version.with_sweekt(counter);
        self.gradle.write_version_file(&bumped.base)?;
        self.git
            .commit(
                self.gradle.version_file(),
                &format!("release: {}", bumped.full_sweekt_version()),
                None,
            )
            .await?;
        self.git.push(false).await?;

        tracing::info!(
            "🎉 Current Sweekt version is bumped to {}",
            bumped.full_sweekt_version()
        );
        Ok(BumpResult::Bumped(bumped))
    }
}

#[async_trait]
impl Job for BumpVersionFileJob {
    fn name(&self) -> &'static str {
        "Bump version file"
    }

    async fn run(&self, input: &JobInput) -> Result<JobOutcome> {
        let (branches, tag) = match &input.branches {
            None => {
                if !self.trigger_ref.is_tag() {
                    return Err(BotError::precondition(format!(
                        "The trigger ref must be a tag: `{}`.",
                        self.trigger_ref
                    )));
                }
                let tag = self.trigger_ref.short_name().to_string();
                tracing::info!(
                    "🆕 Release '{}' is created, bumping version for 'changed/*' branches...",
                    tag
                );
                (self.changed_branches().await?, tag)
            }
            Some(branches) => match self.repo.latest_release().await? {
                Some(release) => (branches.clone(), release.tag_name),
                None => {
                    return Ok(JobOutcome::skipped(format!(
                        "{} has no release yet",
                        self.repo.context().repository
                    )))
                }
            },
        };

        if branches.is_empty() {
            return Ok(JobOutcome::skipped(format!("no branch to bump to '{}'", tag)));
        }

        for branch in &branches {
            tracing::debug!("Bumping '{}' to release '{}'", branch, tag);
            self.bump_version(branch, &tag).await?;
        }
        Ok(JobOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilesConfig;
    use crate::exec::Shell;
    use crate::forge::MockRepository;
    use crate::git::{GitOperation, MockGit};
    use crate::retry::RetryPolicy;
    use std::path::PathBuf;

    fn job(dir: &std::path::Path, git: MockGit, repo: MockRepository, trigger: &str) -> BumpVersionFileJob {
        let git: Arc<dyn Git> = Arc::new(git);
        let gradle = GradleService::new(
            git.clone(),
            Shell::new(dir).quiet(),
            FilesConfig::default(),
            RetryPolicy::default(),
        );
        BumpVersionFileJob::new(git, gradle, Arc::new(repo), TriggerRef::parse(trigger))
    }

    #[tokio::test]
    async fn test_requires_tag_without_branches() {
        let dir = tempfile::tempdir().unwrap();
        let job = job(
            dir.path(),
            MockGit::new(dir.path()),
            MockRepository::new("meowool/sweekt-gradle"),
            "refs/heads/main",
        );

        let err = job.run(&JobInput::default()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Precondition failed: The trigger ref must be a tag: `main`."
        );
    }

    #[tokio::test]
    async fn test_release_bumps_changed_branches_only() {
        let dir = tempfile::tempdir().unwrap();
        let git = MockGit::new(dir.path())
            .with_branch_file("changed/v8.4.0", "version.txt", "8.4.0.1")
            .with_branch_file("changed/v8.5.0", "version.txt", "8.5.0.2");
        let repo = MockRepository::new("meowool/sweekt-gradle").with_branches(&[
            "main",
            "upstream/v8.6.0",
            "changed/v8.4.0",
            "changed/v8.5.0",
        ]);
        let job = job(dir.path(), git.clone(), repo, "refs/tags/v2");

        assert_eq!(job.run(&JobInput::default()).await.unwrap(), JobOutcome::Success);

        let commits: Vec<String> = git
            .operations()
            .into_iter()
            .filter_map(|op| match op {
                GitOperation::Commit { message, .. } => Some(message),
                _ => None,
            })
            .collect();
        // 8.5.0.2 already matches v2
        assert_eq!(commits, vec!["release: 8.4.0.2"]);
    }

    #[tokio::test]
    async fn test_no_release_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let git = MockGit::new(dir.path());
        let job = job(
            dir.path(),
            git.clone(),
            MockRepository::new("meowool/sweekt-gradle"),
            "refs/heads/changed/v8.4.0",
        );

        let outcome = job
            .run(&JobInput::with_branches(["changed/v8.4.0"]))
            .await
            .unwrap();

        assert!(matches!(outcome, JobOutcome::Skipped(_)));
        assert!(git.operations().is_empty());
    }

    #[tokio::test]
    async fn test_bump_commits_version_file() {
        let dir = tempfile::tempdir().unwrap();
        let git = MockGit::new(dir.path()).with_branch_file("release/7.6-RC1", "version.txt", "7.6");
        let job = job(
            dir.path(),
            git.clone(),
            MockRepository::new("meowool/sweekt-gradle"),
            "refs/tags/v3",
        );

        let result = job.bump_version("release/7.6-RC1", "v3").await.unwrap();

        let version = match result {
            BumpResult::Bumped(version) => version,
            BumpResult::Unchanged => panic!("expected a bump"),
        };
        assert_eq!(version.full_sweekt_version(), "7.6.0.3-rc-1");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("version.txt")).unwrap(),
            "7.6.0.3"
        );
        assert_eq!(
            git.operations()[1..],
            [
                GitOperation::Commit {
                    path: PathBuf::from("version.txt"),
                    message: "release: 7.6.0.3-rc-1".to_string(),
                    description: None,
                },
                GitOperation::Push {
                    branch: "release/7.6-RC1".to_string(),
                    skip_ci: false,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_tag_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let git = MockGit::new(dir.path()).with_branch_file("changed/v8.4.0", "version.txt", "8.4.0.1");
        let job = job(
            dir.path(),
            git.clone(),
            MockRepository::new("meowool/sweekt-gradle"),
            "refs/tags/latest",
        );

        let err = job.bump_version("changed/v8.4.0", "latest").await.unwrap_err();

        assert!(matches!(err, BotError::Version(_)));
        assert_eq!(
            git.operations(),
            vec![GitOperation::Checkout("changed/v8.4.0".to_string())]
        );
    }
}
