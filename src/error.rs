use thiserror::Error;

use crate::exec::ExecError;

/// Unified error type for sweekt-bot operations
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GitHub API error ({status}): {message}")]
    Forge { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in sweekt-bot
pub type Result<T> = std::result::Result<T, BotError>;

impl BotError {
    /// Create a precondition error with context
    pub fn precondition(msg: impl Into<String>) -> Self {
        BotError::Precondition(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        BotError::Version(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        BotError::Config(msg.into())
    }

    /// Create a forge error from a response status and message
    pub fn forge(status: u16, msg: impl Into<String>) -> Self {
        BotError::Forge {
            status,
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BotError::precondition("The trigger ref must be a tag: `main`.");
        assert_eq!(
            err.to_string(),
            "Precondition failed: The trigger ref must be a tag: `main`."
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BotError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_missing_env_names_the_key() {
        let err = BotError::MissingEnv("GITHUB_REF".to_string());
        assert_eq!(err.to_string(), "Missing environment variable: GITHUB_REF");
    }

    #[test]
    fn test_forge_error_carries_status() {
        let err = BotError::forge(502, "Bad Gateway");
        assert_eq!(err.to_string(), "GitHub API error (502): Bad Gateway");
    }

    #[test]
    fn test_exec_error_is_transparent() {
        let exec = ExecError {
            command: vec!["git".to_string(), "push".to_string()],
            exit_code: 128,
            stdout: String::new(),
            stderr: "fatal: no remote".to_string(),
        };
        let err: BotError = exec.into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to execute command: $ git push"));
        assert!(msg.contains("Exit code: 128"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (BotError::precondition("x"), "Precondition failed"),
            (BotError::version("x"), "Version parsing error"),
            (BotError::config("x"), "Configuration error"),
            (BotError::forge(404, "x"), "GitHub API error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
