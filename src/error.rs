//! Error handling module for rechain
//!
//! Provides centralized error handling with proper error types using thiserror.
//! All errors in the application should use these types for consistency.

use thiserror::Error;

/// Main error type for rechain
#[derive(Error, Debug)]
pub enum RechainError {
    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Precondition failures (missing manifest, empty dependency set, no
    /// usable package manager). Fatal for the run, never retried.
    #[error("{0}")]
    Precondition(String),

    /// A subprocess could not be spawned at all
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// A subprocess ran but exited unsuccessfully (-1 when killed by signal)
    #[error("Command `{command}` failed with exit code {code}")]
    Subprocess { command: String, code: i32 },

    /// Backup creation errors
    #[error("Backup failed: {0}")]
    Backup(String),

    /// Terminal/prompt errors
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Stage machine errors (invalid transition, missing prior stage)
    #[error("State error: {0}")]
    State(String),

    /// The cancellation token was observed between steps
    #[error("Interrupted")]
    Interrupted,
}

/// Result type alias for rechain operations
pub type Result<T> = std::result::Result<T, RechainError>;

// Convenient error constructors
impl RechainError {
    /// Create a precondition failure
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a spawn error for the given command line
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Create a subprocess failure for the given command line
    pub fn subprocess(command: impl Into<String>, code: i32) -> Self {
        Self::Subprocess {
            command: command.into(),
            code,
        }
    }

    /// Create a backup error
    pub fn backup(msg: impl Into<String>) -> Self {
        Self::Backup(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Create a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// True when this error means the user asked to stop, not that
    /// something broke
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RechainError::precondition("no dependencies declared in package.json");
        assert_eq!(err.to_string(), "no dependencies declared in package.json");

        let err = RechainError::subprocess("npm install", 1);
        assert_eq!(
            err.to_string(),
            "Command `npm install` failed with exit code 1"
        );

        let err = RechainError::terminal("raw mode unavailable");
        assert_eq!(err.to_string(), "Terminal error: raw mode unavailable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RechainError = io_err.into();
        assert!(matches!(err, RechainError::Io(_)));
    }

    #[test]
    fn test_error_constructors() {
        let err = RechainError::state("cannot enter Backup from Idle");
        assert!(matches!(err, RechainError::State(_)));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such binary");
        let err = RechainError::spawn("aikido-npm --version", io_err);
        assert!(matches!(err, RechainError::Spawn { .. }));
    }

    #[test]
    fn test_interrupted_is_not_a_failure() {
        assert!(RechainError::Interrupted.is_interrupted());
        assert!(!RechainError::subprocess("yarn install", 2).is_interrupted());
    }
}
