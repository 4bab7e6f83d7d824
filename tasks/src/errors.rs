//! Error types for the tasks crate.

use thiserror::Error;

/// Error types for task management
#[derive(Error, Debug, Clone)]
pub enum TasksError {
    // Validation errors
    #[error("Task name cannot be empty")]
    EmptyName,

    #[error("Invalid task name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Deadline {deadline} has already passed, choose a future date and time")]
    DeadlinePassed { deadline: String },

    #[error("Invalid deadline '{value}': expected MM/DD/YY [HH:MM[:SS]]")]
    InvalidDeadline { value: String },

    #[error("Invalid time needed '{value}': {reason}")]
    InvalidTimeNeeded { value: String, reason: String },

    #[error("Invalid priority: '{priority}'")]
    InvalidPriority { priority: String },

    #[error("Invalid sort mode: '{mode}'")]
    InvalidSortMode { mode: String },

    // Parse errors
    #[error("Malformed task line: {reason}")]
    LineParse { reason: String },

    // Storage errors
    #[error("Storage error: {reason}")]
    StorageError { reason: String },

    #[error("Failed to read file '{path}': {reason}")]
    FileReadError { path: String, reason: String },

    #[error("Failed to write file '{path}': {reason}")]
    FileWriteError { path: String, reason: String },

    #[error("Failed to parse JSON: {reason}")]
    JsonParseError { reason: String },

    // Configuration errors
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    // General errors
    #[error("Operation cancelled")]
    Cancelled,
}

impl TasksError {
    /// Whether this error came from rejected user input.
    ///
    /// Validation errors leave the store untouched and are shown as
    /// warnings rather than failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyName
                | Self::InvalidName { .. }
                | Self::DeadlinePassed { .. }
                | Self::InvalidDeadline { .. }
                | Self::InvalidTimeNeeded { .. }
                | Self::InvalidPriority { .. }
                | Self::InvalidSortMode { .. }
        )
    }
}

impl From<std::io::Error> for TasksError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TasksError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParseError {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for tasks operations
pub type TasksResult<T> = Result<T, TasksError>;
