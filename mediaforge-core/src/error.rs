//! Error types for mediaforge-core.
//!
//! Validation errors (`InputNotFound`, `InvalidOptions`, `MissingDuration`,
//! `OutputExists`) are raised before any process is spawned. External tool
//! failures only exist after the process has exited and always carry the
//! classified `(message, suggestion)` pair.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Cannot determine duration of {0}; the file must be probed first")]
    MissingDuration(String),

    #[error("Output file already exists: {} (use --overwrite to replace it)", .0.display())]
    OutputExists(PathBuf),

    #[error("{message}")]
    ExternalToolFailure {
        tool: String,
        exit_code: Option<i32>,
        message: String,
        suggestion: String,
    },

    #[error("{0} was terminated before it finished")]
    Cancelled(String),

    #[error("Failed to clean up temporary file {}: {source}", path.display())]
    TempResourceCleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Required dependency '{0}' not found")]
    DependencyNotFound(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed while waiting for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Human follow-up advice, when the error carries one.
    #[must_use]
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::ExternalToolFailure { suggestion, .. } => Some(suggestion),
            Self::OutputExists(_) => Some("Pass --overwrite (-y) or choose another output path."),
            Self::MissingDuration(_) => Some("Check that the input is a readable media file with a known duration."),
            Self::DependencyNotFound(_) => Some("Install ffmpeg or point MEDIAFORGE_FFMPEG / MEDIAFORGE_FFPROBE at the binaries."),
            _ => None,
        }
    }

    /// True for errors detected before any external process was started.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InputNotFound(_)
                | Self::InvalidOptions(_)
                | Self::MissingDuration(_)
                | Self::OutputExists(_)
        )
    }
}

/// Shorthand for an `InvalidOptions` error.
pub fn invalid_options(message: impl Into<String>) -> CoreError {
    CoreError::InvalidOptions(message.into())
}

/// Maps a spawn failure, distinguishing a missing binary from other IO errors.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    let cmd = cmd.into();
    if err.kind() == io::ErrorKind::NotFound {
        CoreError::DependencyNotFound(cmd)
    } else {
        CoreError::CommandStart(cmd, err)
    }
}

pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}
