//! Bot jobs triggered by repository workflows
//!
//! - [BumpVersionFileJob]: aligns `version.txt` on fork branches with the
//!   latest release tag
//! - [SyncUpstreamTagsJob]: checks out new upstream tags as `upstream/*`
//!   branches
//!
//! Jobs process their items one at a time and stop at the first error.

pub mod bump_version;
pub mod sync_upstream;

pub use bump_version::{BumpResult, BumpVersionFileJob};
pub use sync_upstream::{sync_candidates, SyncSettings, SyncUpstreamTagsJob};

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::ui;

/// Parameters passed to a job by its workflow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobInput {
    /// Branches to process; `None` lets the job discover them
    pub branches: Option<Vec<String>>,
}

impl JobInput {
    pub fn with_branches<I, S>(branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        JobInput {
            branches: Some(branches.into_iter().map(Into::into).collect()),
        }
    }
}

/// How a job finished when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    /// Nothing to do; the reason is reported to the log
    Skipped(String),
}

impl JobOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        JobOutcome::Skipped(reason.into())
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Success => f.write_str("success"),
            JobOutcome::Skipped(reason) => write!(f, "skipped: {}", reason),
        }
    }
}

#[async_trait]
pub trait Job: Send + Sync {
    /// Name shown as the log group title
    fn name(&self) -> &'static str;

    async fn run(&self, input: &JobInput) -> Result<JobOutcome>;
}

/// Run `job` inside a log group and report its outcome.
pub async fn execute(job: &dyn Job, input: &JobInput) -> Result<JobOutcome> {
    let outcome = ui::group(job.name(), job.run(input)).await?;
    match &outcome {
        JobOutcome::Success => tracing::info!("✅ {} finished", job.name()),
        JobOutcome::Skipped(reason) => tracing::info!("⏭️ {} skipped: {}", job.name(), reason),
    }
    Ok(outcome)
}
