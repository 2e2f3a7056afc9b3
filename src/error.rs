//! Central error types for the setup pipeline.
//!
//! Every step returns `Result<(), SetupError>`; the pipeline never
//! downgrades or retries, so the first error is terminal for the run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by setup steps.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The operator cancelled an interactive prompt.
    #[error("prompt aborted by operator")]
    PromptAborted,

    /// An external command exited nonzero or could not be started.
    #[error("command `{program}` failed: {reason}")]
    CommandFailed { program: String, reason: String },

    /// A filesystem operation (create/chmod/write) failed.
    #[error("filesystem operation on {path:?} failed: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Script or cron generation hit a missing prerequisite directory or
    /// an invalid schedule expression.
    #[error("generation error: {0}")]
    Generation(String),

    /// A required configuration field was unset or malformed when a step
    /// needed it.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for setup operations
pub type Result<T> = std::result::Result<T, SetupError>;

// Convenient error constructors
impl SetupError {
    /// Create a command failure error
    pub fn command(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CommandFailed {
            program: program.into(),
            reason: reason.into(),
        }
    }

    /// Create a filesystem error
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a generation error
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }
}
