//! Error types for the autotag system
//!
//! This module provides error handling using thiserror for structured error
//! definitions and anyhow for error propagation at the binary edge.

use thiserror::Error;

/// Main error type for autotag operations
#[derive(Error, Debug)]
pub enum AutotagError {
    /// One or more rule validation failures, reported together
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Rule not found in the store
    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    /// Group not found in the store
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// Directory alias not registered
    #[error("Unknown alias: {0}")]
    UnknownAlias(String),

    /// Rule match string that cannot be compiled into a strategy
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Text analyzer failure
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem watcher error
    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl AutotagError {
    /// Whether this error was caused by user input rather than the environment.
    ///
    /// The CLI uses this to decide between a terse message and a logged failure.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AutotagError::Validation(_)
                | AutotagError::RuleNotFound(_)
                | AutotagError::GroupNotFound(_)
                | AutotagError::UnknownAlias(_)
                | AutotagError::InvalidPattern(_)
        )
    }
}

/// Result type alias for autotag operations
pub type Result<T> = std::result::Result<T, AutotagError>;

/// Convert anyhow::Error to AutotagError
impl From<anyhow::Error> for AutotagError {
    fn from(err: anyhow::Error) -> Self {
        AutotagError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AutotagError::RuleNotFound("keyword-docker".to_string());
        assert_eq!(err.to_string(), "Rule not found: keyword-docker");
    }

    #[test]
    fn test_validation_joins_all_errors() {
        let err = AutotagError::Validation(vec![
            "tags must not be empty".to_string(),
            "lemma and stem are mutually exclusive".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: tags must not be empty; lemma and stem are mutually exclusive"
        );
        assert!(err.is_user_error());
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        let err: AutotagError = json_err.into();
        assert!(matches!(err, AutotagError::Serialization(_)));
        assert!(!err.is_user_error());
    }
}
