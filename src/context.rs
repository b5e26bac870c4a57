//! CI environment of the current workflow run.

use std::fmt;

use crate::domain::TriggerRef;
use crate::error::{BotError, Result};

const DEFAULT_SERVER_URL: &str = "https://github.com";
const DEFAULT_API_URL: &str = "https://api.github.com";

/// Read a required environment variable, failing if it is unset or empty.
pub fn env(key: &str) -> Result<String> {
    env_or_none(key).ok_or_else(|| BotError::MissingEnv(key.to_string()))
}

/// Read an optional environment variable; empty values count as unset.
pub fn env_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Whether the runner was started with debug logging (`RUNNER_DEBUG=1`).
pub fn is_debug() -> bool {
    env_or_none("RUNNER_DEBUG").as_deref() == Some("1")
}

/// A GitHub repository together with the endpoints and token used to reach it
#[derive(Clone, PartialEq, Eq)]
pub struct RepositoryContext {
    /// `owner/name`
    pub repository: String,
    pub server_url: String,
    pub api_url: String,
    pub token: Option<String>,
}

// Custom Debug to avoid exposing the token
impl fmt::Debug for RepositoryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryContext")
            .field("repository", &self.repository)
            .field("server_url", &self.server_url)
            .field("api_url", &self.api_url)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

impl RepositoryContext {
    pub fn new(repository: impl Into<String>) -> Self {
        RepositoryContext {
            repository: repository.into(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }

    /// Build the context of the repository running the workflow.
    ///
    /// Requires `GITHUB_REPOSITORY`; `GITHUB_TOKEN`, `GITHUB_SERVER_URL`
    /// and `GITHUB_API_URL` are optional.
    pub fn from_env() -> Result<Self> {
        Ok(RepositoryContext {
            repository: env("GITHUB_REPOSITORY")?,
            server_url: env_or_none("GITHUB_SERVER_URL")
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            api_url: env_or_none("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token: env_or_none("GITHUB_TOKEN"),
        })
    }

    /// Same endpoints and credentials, pointed at another repository.
    pub fn with_repository(&self, repository: impl Into<String>) -> Self {
        RepositoryContext {
            repository: repository.into(),
            ..self.clone()
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Web URL of the repository, also used as its git remote.
    pub fn repository_url(&self) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            self.repository
        )
    }
}

/// Everything a job needs to know about the run that triggered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub trigger_ref: TriggerRef,
    pub repository: RepositoryContext,
}

impl Context {
    /// Requires `GITHUB_REF` in addition to the repository variables.
    pub fn from_env() -> Result<Self> {
        Ok(Context {
            trigger_ref: TriggerRef::parse(&env("GITHUB_REF")?),
            repository: RepositoryContext::from_env()?,
        })
    }
}
