use std::path::Path;

use async_trait::async_trait;

use crate::error::{BotError, Result};
use crate::exec::{ExecOutput, Shell};
use crate::git::{annotate_skip_ci, Git};

/// [Git] implementation backed by the `git` command line.
///
/// Writes go through the CLI so they use the runner's configured
/// credentials; the current branch is read with `git2`.
#[derive(Debug, Clone)]
pub struct ShellGit {
    shell: Shell,
    /// Remote that `push` targets
    remote: String,
}

impl ShellGit {
    pub fn new(shell: Shell, remote: impl Into<String>) -> Self {
        ShellGit {
            shell,
            remote: remote.into(),
        }
    }

    async fn git<I, S>(&self, args: I) -> Result<ExecOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.shell.run("git", args).await
    }
}

/// Branch HEAD points at, read symbolically so an unborn branch resolves.
fn head_branch(workdir: &Path) -> Result<String> {
    let repo = git2::Repository::discover(workdir)?;
    let head = repo.find_reference("HEAD")?;
    let target = head
        .symbolic_target()
        .ok_or_else(|| BotError::precondition("HEAD is detached, no current branch"))?;
    target
        .strip_prefix("refs/heads/")
        .map(str::to_string)
        .ok_or_else(|| BotError::precondition(format!("HEAD points outside branches: {}", target)))
}

#[async_trait]
impl Git for ShellGit {
    async fn checkout(&self, reference: &str) -> Result<()> {
        self.git(["checkout", reference]).await?;
        Ok(())
    }

    async fn checkout_new_branch(&self, start_point: &str, new_branch: &str) -> Result<()> {
        self.git(["checkout", "-b", new_branch, start_point]).await?;
        Ok(())
    }

    async fn current_branch(&self) -> Result<String> {
        let workdir = self.shell.workdir().to_path_buf();
        tokio::task::spawn_blocking(move || head_branch(&workdir))
            .await
            .map_err(std::io::Error::other)?
    }

    async fn commit(&self, path: &Path, message: &str, description: Option<&str>) -> Result<()> {
        let path = path.to_string_lossy();
        self.git(["add", &*path]).await?;

        let mut args = vec!["commit", "-m", message];
        if let Some(description) = description {
            args.extend(["-m", description]);
        }
        self.git(args).await?;
        Ok(())
    }

    async fn push(&self, skip_ci: bool) -> Result<()> {
        if skip_ci {
            let last = self.git(["log", "-1", "--format=%B"]).await?;
            let message = annotate_skip_ci(&last.stdout);
            self.git(["commit", "--amend", "--only", "-m", message.as_str()])
                .await?;
        }
        self.git(["push", "--set-upstream", self.remote.as_str(), "HEAD"])
            .await?;
        Ok(())
    }

    async fn fetch(
        &self,
        remote: &str,
        source: &str,
        destination: &str,
        options: &[&str],
    ) -> Result<()> {
        let refspec = format!("{}:{}", source, destination);
        let mut args = vec!["fetch"];
        args.extend_from_slice(options);
        args.extend([remote, refspec.as_str()]);
        self.git(args).await?;
        Ok(())
    }

    async fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.git(["remote", "add", name, url]).await?;
        Ok(())
    }
}
