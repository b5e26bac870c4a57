use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::retry::RetryPolicy;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "sweekt-bot.toml";

/// Represents the complete configuration for sweekt-bot.
///
/// Every section is optional; missing values fall back to the settings
/// the fork's workflows rely on.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_upstream_repository() -> String {
    "gradle/gradle".to_string()
}

fn default_upstream_remote() -> String {
    "upstream".to_string()
}

fn default_floor_version() -> String {
    "8.3.0".to_string()
}

/// Where upstream tags come from and which of them are synced.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UpstreamConfig {
    /// `owner/name` of the upstream repository
    #[serde(default = "default_upstream_repository")]
    pub repository: String,

    /// Local name of the upstream git remote
    #[serde(default = "default_upstream_remote")]
    pub remote: String,

    /// Only tags newer than this version are synced
    #[serde(default = "default_floor_version")]
    pub floor_version: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            repository: default_upstream_repository(),
            remote: default_upstream_remote(),
            floor_version: default_floor_version(),
        }
    }
}

fn default_git_remote() -> String {
    "origin".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    /// Remote that commits are pushed to
    #[serde(default = "default_git_remote")]
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_git_remote(),
        }
    }
}

fn default_version_file() -> PathBuf {
    PathBuf::from("version.txt")
}

fn default_wrapper_properties() -> PathBuf {
    PathBuf::from("gradle/wrapper/gradle-wrapper.properties")
}

fn default_verification_metadata() -> PathBuf {
    PathBuf::from("gradle/verification-metadata.xml")
}

fn default_workflows_dir() -> PathBuf {
    PathBuf::from(".github")
}

/// Paths of the tracked files, relative to the working directory.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FilesConfig {
    #[serde(default = "default_version_file")]
    pub version_file: PathBuf,

    #[serde(default = "default_wrapper_properties")]
    pub wrapper_properties: PathBuf,

    #[serde(default = "default_verification_metadata")]
    pub verification_metadata: PathBuf,

    /// Directory carried onto every synced upstream branch
    #[serde(default = "default_workflows_dir")]
    pub workflows_dir: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            version_file: default_version_file(),
            wrapper_properties: default_wrapper_properties(),
            verification_metadata: default_verification_metadata(),
            workflows_dir: default_workflows_dir(),
        }
    }
}

fn default_clean_attempts() -> u32 {
    2
}

fn default_delay_secs() -> u64 {
    3
}

/// Retry settings for the Gradle `clean` task.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first
    #[serde(default = "default_clean_attempts")]
    pub clean_attempts: u32,

    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            clean_attempts: default_clean_attempts(),
            delay_secs: default_delay_secs(),
        }
    }
}

impl RetryConfig {
    pub fn clean_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.clean_attempts,
            delay: Duration::from_secs(self.delay_secs),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `sweekt-bot.toml` in `workdir`
/// 3. `.sweekt-bot.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>, workdir: &Path) -> Result<Config> {
    let local = workdir.join(CONFIG_FILE_NAME);
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if local.exists() {
        fs::read_to_string(local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
