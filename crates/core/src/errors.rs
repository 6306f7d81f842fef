//! Error types for orangepad-core
//!
//! This module defines the crate-wide error type. Every failure is a local
//! recovery for the caller: the command boundary turns these into structured
//! error objects instead of panicking.

use thiserror::Error;

/// Result type alias for orangepad operations
pub type Result<T> = std::result::Result<T, PadError>;

/// Main error type for orangepad
#[derive(Debug, Error)]
pub enum PadError {
    /// Command not found in registry
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Invalid command arguments
    #[error("Invalid arguments for command '{command}': {reason}")]
    InvalidArgs { command: String, reason: String },

    /// No prompt with the given id
    #[error("Prompt not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Title/tag generation service failed or is unreachable
    #[error("Generation error: {0}")]
    GenerationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Library used before `setup`
    #[error("Prompt library not initialized")]
    NotInitialized,

    /// Generic error (catch-all)
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for PadError {
    fn from(err: anyhow::Error) -> Self {
        PadError::Other(err.to_string())
    }
}

impl From<String> for PadError {
    fn from(err: String) -> Self {
        PadError::Other(err)
    }
}

impl From<&str> for PadError {
    fn from(err: &str) -> Self {
        PadError::Other(err.to_string())
    }
}

impl PadError {
    /// Get user-friendly error message for display
    pub fn user_message(&self) -> String {
        match self {
            PadError::CommandNotFound(cmd) => {
                format!(
                    "Command '{}' not found. Use list_commands() for available commands.",
                    cmd
                )
            },
            PadError::InvalidArgs { command, reason } => {
                format!("Invalid arguments for '{}': {}", command, reason)
            },
            PadError::NotFound(id) => format!("No prompt with id '{}'", id),
            PadError::ValidationError(msg) => msg.clone(),
            PadError::GenerationError(msg) => {
                format!("AI generation failed: {}", msg)
            },
            PadError::NotInitialized => {
                "Prompt library is not initialized. Call setup() first.".to_string()
            },
            PadError::DatabaseError(err) => {
                format!("Database error: {}", err)
            },
            _ => self.to_string(),
        }
    }

    /// Get error category for logging and error objects
    pub fn category(&self) -> &'static str {
        match self {
            PadError::CommandNotFound(_) => "command",
            PadError::InvalidArgs { .. } => "arguments",
            PadError::NotFound(_) => "not_found",
            PadError::SerdeError(_) => "serialization",
            PadError::DatabaseError(_) => "database",
            PadError::IoError(_) => "io",
            PadError::GenerationError(_) => "generation",
            PadError::ConfigError(_) => "config",
            PadError::ValidationError(_) => "validation",
            PadError::NotInitialized => "setup",
            PadError::Other(_) => "other",
        }
    }

    /// Shorthand for an `InvalidArgs` error
    pub fn invalid_args(command: &str, reason: impl Into<String>) -> Self {
        PadError::InvalidArgs {
            command: command.to_string(),
            reason:  reason.into(),
        }
    }
}
