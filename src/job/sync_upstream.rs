//! Mirror new upstream release tags as `upstream/<tag>` branches.
//!
//! Each synced branch gets the fork's workflows directory committed on top,
//! otherwise the workflows that process `upstream/*` branches would not run
//! on it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::{Job, JobInput, JobOutcome};
use crate::config::Config;
use crate::domain::{checkout_states, BranchState, Semver, TrackedBranch};
use crate::error::Result;
use crate::files::copy_dir_recursive;
use crate::forge::RepositoryService;
use crate::git::Git;

const SYNC_COMMIT_MESSAGE: &str = "feat(ci): add workflows for auto syncing upstream";

/// Fetched tags are stored under this prefix so they never clash with ours
const FETCHED_TAG_PREFIX: &str = "fetched-";

/// Where and what to sync
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Name given to the upstream remote
    pub remote: String,
    /// Only tags strictly greater than this are synced
    pub floor: Semver,
    pub workdir: PathBuf,
    /// Relative to `workdir`
    pub workflows_dir: PathBuf,
}

impl SyncSettings {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        SyncSettings::from_config(&Config::default(), workdir)
    }

    pub fn from_config(config: &Config, workdir: impl Into<PathBuf>) -> Self {
        SyncSettings {
            remote: config.upstream.remote.clone(),
            floor: Semver::new(config.upstream.floor_version.as_str()),
            workdir: workdir.into(),
            workflows_dir: config.files.workflows_dir.clone(),
        }
    }
}

/// Why a tag is or is not synced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// A branch already exists for the tag, under these states
    CheckedOut(Vec<BranchState>),
    /// Not newer than the floor version
    Outdated,
    /// RC, milestone or other `-` suffixed tags
    PreRelease,
}

fn eligibility<B: AsRef<str>>(tag: &str, branches: &[B], floor: &Semver) -> Eligibility {
    let states = checkout_states(tag, branches);
    if !states.is_empty() {
        Eligibility::CheckedOut(states)
    } else if Semver::new(tag) <= *floor {
        Eligibility::Outdated
    } else if tag.contains('-') {
        Eligibility::PreRelease
    } else {
        Eligibility::Eligible
    }
}

/// Classify every distinct tag, keeping the input order.
pub fn plan<T, B>(tags: &[T], branches: &[B], floor: &Semver) -> Vec<(String, Eligibility)>
where
    T: AsRef<str>,
    B: AsRef<str>,
{
    let mut planned: Vec<(String, Eligibility)> = Vec::new();
    for tag in tags.iter().map(AsRef::as_ref) {
        if planned.iter().any(|(seen, _)| seen == tag) {
            continue;
        }
        planned.push((tag.to_string(), eligibility(tag, branches, floor)));
    }
    planned
}

/// Upstream tags that should be synced, in input order and without repeats.
pub fn sync_candidates<T, B>(tags: &[T], branches: &[B], floor: &Semver) -> Vec<String>
where
    T: AsRef<str>,
    B: AsRef<str>,
{
    plan(tags, branches, floor)
        .into_iter()
        .filter(|(_, eligibility)| *eligibility == Eligibility::Eligible)
        .map(|(tag, _)| tag)
        .collect()
}

pub struct SyncUpstreamTagsJob {
    git: Arc<dyn Git>,
    current_repo: Arc<dyn RepositoryService>,
    upstream_repo: Arc<dyn RepositoryService>,
    settings: SyncSettings,
}

impl SyncUpstreamTagsJob {
    pub fn new(
        git: Arc<dyn Git>,
        current_repo: Arc<dyn RepositoryService>,
        upstream_repo: Arc<dyn RepositoryService>,
        settings: SyncSettings,
    ) -> Self {
        SyncUpstreamTagsJob {
            git,
            current_repo,
            upstream_repo,
            settings,
        }
    }

    fn workflows_dir(&self) -> PathBuf {
        self.settings.workdir.join(&self.settings.workflows_dir)
    }

    fn commit_description(&self) -> String {
        format!(
            "See [README]({}/blob/-/.github/workflows/bot/readme.md) for more details.",
            self.current_repo.context().repository_url()
        )
    }

    /// Check out `tag` as `upstream/<tag>` with the saved workflows and push it.
    async fn sync_tag(&self, tag: &str, workflows_snapshot: &Path) -> Result<()> {
        let fetched = format!("{}{}", FETCHED_TAG_PREFIX, tag);
        let branch = TrackedBranch::new(BranchState::Upstream, tag).name();

        self.git
            .fetch(
                &self.settings.remote,
                &format!("+refs/tags/{}", tag),
                &format!("refs/tags/{}", fetched),
                &["--no-tags"],
            )
            .await?;
        self.git
            .checkout_new_branch(&format!("tags/{}", fetched), &branch)
            .await?;

        copy_dir_recursive(workflows_snapshot, &self.workflows_dir())?;
        self.git
            .commit(
                &self.settings.workflows_dir,
                SYNC_COMMIT_MESSAGE,
                Some(&self.commit_description()),
            )
            .await?;
        self.git.push(false).await?;

        tracing::info!("🔫 Tag '{}' is synced to '{}'.", tag, branch);
        Ok(())
    }
}

#[async_trait]
impl Job for SyncUpstreamTagsJob {
    fn name(&self) -> &'static str {
        "Sync upstream tags"
    }

    async fn run(&self, _input: &JobInput) -> Result<JobOutcome> {
        let tags: Vec<String> = self
            .upstream_repo
            .tags()
            .await?
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        let branches: Vec<String> = self
            .current_repo
            .branches()
            .await?
            .into_iter()
            .map(|branch| branch.name)
            .collect();

        // Checking out a tag replaces the working tree, so keep a copy
        let snapshot = tempfile::tempdir()?;
        copy_dir_recursive(&self.workflows_dir(), snapshot.path())?;
        self.git
            .add_remote(
                &self.settings.remote,
                &self.upstream_repo.context().repository_url(),
            )
            .await?;

        let mut synced = 0;
        for (tag, eligibility) in plan(&tags, &branches, &self.settings.floor) {
            match eligibility {
                Eligibility::Eligible => {
                    self.sync_tag(&tag, snapshot.path()).await?;
                    synced += 1;
                }
                Eligibility::CheckedOut(states) => {
                    if states.len() > 1 {
                        let names: Vec<String> = states
                            .iter()
                            .map(|state| TrackedBranch::new(*state, tag.as_str()).name())
                            .collect();
                        tracing::warn!(
                            "Tag '{}' is checked out on more than one branch: {}",
                            tag,
                            names.join(", ")
                        );
                    }
                    tracing::info!("💫 Skip tag '{}' (already checked out).", tag);
                }
                Eligibility::Outdated => {
                    tracing::debug!("Tag '{}' is not newer than {}", tag, self.settings.floor)
                }
                Eligibility::PreRelease => tracing::debug!("Tag '{}' is a pre-release", tag),
            }
        }

        if synced == 0 {
            tracing::info!("🔫 No tags found in the upstream repository that need to be sync.");
            return Ok(JobOutcome::skipped("no new upstream tags"));
        }
        tracing::info!("🔫 Sync upstream tags completed.");
        Ok(JobOutcome::Success)
    }
}
