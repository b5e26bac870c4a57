//! Gradle wrapper invocation and version bookkeeping for a fork checkout.

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::config::FilesConfig;
use crate::domain::distribution::SNAPSHOT_DISTRIBUTION_URL_PATH;
use crate::domain::{BaseVersion, Distribution, GradleVersion};
use crate::error::{BotError, Result};
use crate::exec::{ExecOutput, Shell};
use crate::git::Git;
use crate::retry::{retry, RetryPolicy};

/// Flags appended to every wrapper invocation
const GRADLE_FLAGS: [&str; 4] = [
    "--no-parallel",
    "--no-configuration-cache",
    "-Dfile.encoding=UTF-8",
    "-Duser.language=en",
];

const BACKUP_EXTENSION: &str = "bak";

fn distribution_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^distributionUrl=[^\r\n]*").expect("distribution url pattern is valid")
    })
}

/// Point the wrapper's `distributionUrl` at the released `full_version`.
///
/// Only snapshot distributions are pinned, and only the last
/// `distributionUrl=` line is rewritten. Returns the new content, or
/// `None` when nothing would change. Line endings are preserved.
pub fn pin_distribution_url(content: &str, full_version: &str) -> Option<String> {
    if !content.contains(SNAPSHOT_DISTRIBUTION_URL_PATH) {
        return None;
    }
    // The last definition is the one the properties loader keeps
    let line = distribution_url_regex().find_iter(content).last()?;
    let pinned = format!(
        "{}distributionUrl={}{}",
        &content[..line.start()],
        Distribution::Bin.wrapper_url(full_version),
        &content[line.end()..]
    );
    (pinned != content).then_some(pinned)
}

/// Operations on the Gradle checkout in the shell's working directory
pub struct GradleService {
    git: Arc<dyn Git>,
    shell: Shell,
    files: FilesConfig,
    retry: RetryPolicy,
}

impl GradleService {
    pub fn new(git: Arc<dyn Git>, shell: Shell, files: FilesConfig, retry: RetryPolicy) -> Self {
        GradleService {
            git,
            shell,
            files,
            retry,
        }
    }

    fn path(&self, relative: &Path) -> PathBuf {
        self.shell.workdir().join(relative)
    }

    /// `version.txt`, relative to the working directory
    pub fn version_file(&self) -> &Path {
        &self.files.version_file
    }

    /// Run `gradlew` with `args`, each property passed as `-P<prop>`.
    pub async fn invoke(&self, args: &[&str], properties: &[&str]) -> Result<ExecOutput> {
        let gradlew = self.path(Path::new("gradlew"));
        let mut command: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        command.extend(properties.iter().map(|p| format!("-P{}", p)));
        command.extend(GRADLE_FLAGS.iter().map(|f| f.to_string()));
        self.shell.run(&gradlew.to_string_lossy(), &command).await
    }

    /// `gradlew clean`, retried because it is flaky on CI runners.
    pub async fn clean(&self) -> Result<()> {
        retry("clean project", self.retry, |_| async move {
            self.invoke(&["clean"], &[]).await.map(|_| ())
        })
        .await
    }

    /// Run `block` with dependency verification disabled.
    ///
    /// The verification metadata is moved aside and moved back when the
    /// block finishes, fails, panics or is dropped.
    pub async fn disable_verification<F, T>(&self, block: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let _guard = VerificationGuard::disable(self.path(&self.files.verification_metadata))?;
        block.await
    }

    /// Pin a snapshot wrapper distribution to the branch's release.
    ///
    /// # Returns
    /// * `Ok(Some(version))` - The wrapper properties were rewritten
    /// * `Ok(None)` - The wrapper already points at a release
    pub async fn pin_wrapper_version(&self) -> Result<Option<String>> {
        let path = self.path(&self.files.wrapper_properties);
        let content = fs::read_to_string(&path)?;
        if !content.contains(SNAPSHOT_DISTRIBUTION_URL_PATH) {
            tracing::debug!("{} does not use a snapshot distribution", path.display());
            return Ok(None);
        }

        let full_version = self.calculate_version(None).await?.full_version();
        match pin_distribution_url(&content, &full_version) {
            Some(pinned) => {
                fs::write(&path, pinned)?;
                Ok(Some(full_version))
            }
            None => Ok(None),
        }
    }

    /// Version of `branch`, or of the checked out branch.
    ///
    /// A given branch is checked out first. Pre-release numbers come from
    /// the branch name and the base version from `version.txt`.
    pub async fn calculate_version(&self, branch: Option<&str>) -> Result<GradleVersion> {
        let branch = match branch {
            Some(branch) => {
                self.git.checkout(branch).await?;
                branch.to_string()
            }
            None => self.git.current_branch().await?,
        };

        let content = fs::read_to_string(self.path(&self.files.version_file))?;
        tracing::debug!("versionFileContent: {}", content.trim_end());
        let base = BaseVersion::parse(&content).map_err(|_| {
            BotError::version(format!(
                "Cannot parse the base version of the branch '{}', version file content: {}",
                branch, content
            ))
        })?;

        let version = GradleVersion::for_branch(base, &branch);
        tracing::debug!("calculateGradleVersion: {:?}", version);
        Ok(version)
    }

    /// Build a distribution archive of the checked out branch.
    ///
    /// Returns the archive path, relative to the working directory.
    pub async fn build_distribution(&self, distribution: Distribution) -> Result<PathBuf> {
        let version = self.calculate_version(None).await?.full_sweekt_version();
        let task = distribution.build_task();
        self.invoke(&[task.as_str()], &[]).await?;

        let output = distribution.build_output(&version);
        if !self.path(&output).exists() {
            return Err(BotError::precondition(format!(
                "'{}' finished but {} was not produced",
                task,
                output.display()
            )));
        }
        Ok(output)
    }

    /// Overwrite `version.txt` with `base`.
    pub fn write_version_file(&self, base: &BaseVersion) -> Result<()> {
        fs::write(self.path(&self.files.version_file), base.to_sweekt())?;
        Ok(())
    }
}

/// Keeps the verification metadata moved aside while alive
struct VerificationGuard {
    original: PathBuf,
    backup: PathBuf,
}

impl VerificationGuard {
    fn disable(original: PathBuf) -> Result<Option<Self>> {
        if !original.exists() {
            tracing::debug!("{} not found, nothing to disable", original.display());
            return Ok(None);
        }
        let mut backup = original.clone().into_os_string();
        backup.push(".");
        backup.push(BACKUP_EXTENSION);
        let backup = PathBuf::from(backup);
        fs::rename(&original, &backup)?;
        Ok(Some(VerificationGuard { original, backup }))
    }
}

impl Drop for VerificationGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::rename(&self.backup, &self.original) {
            tracing::error!(
                "Failed to restore {} from {}: {}",
                self.original.display(),
                self.backup.display(),
                e
            );
        }
    }
}
