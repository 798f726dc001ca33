//! Error types for migrender.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for migrender operations.
#[derive(Debug, Error)]
pub enum MigrenderError {
    /// The process could not be prepared (environment, working directory).
    #[error("Startup error: {0}")]
    Startup(String),

    /// The external migration tool could not be started.
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external migration tool exited unsuccessfully.
    #[error("Command '{command}' failed ({status})")]
    CommandFailed {
        command: String,
        status: String,
        /// Captured stdout and stderr of the failed invocation.
        output: String,
    },

    /// Filesystem error with the path that caused it.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A blocking task was cancelled or panicked.
    #[error("Task error: {0}")]
    Task(String),
}

impl MigrenderError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Captured tool output, if this error carries any.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Result type alias for migrender operations.
pub type MigrenderResult<T> = Result<T, MigrenderError>;
