//! Error types for build environment operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::docker::{BuildFailure, EngineError};
use crate::platform::ResolutionError;

/// Result type alias for build environment operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for all build environment operations
#[derive(Error, Debug)]
pub enum Error {
    /// Host identity could not be resolved for user mapping
    #[error("Platform resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// Build context has no Dockerfile
    #[error("Dockerfile not found at: {}", path.display())]
    MissingDockerfile {
        /// Expected Dockerfile path
        path: PathBuf,
    },

    /// Docker daemon unreachable
    #[error("Docker engine unavailable: {reason}")]
    EngineUnavailable {
        /// Reason for the error
        reason: String,
    },

    /// Image build failed; its log has already been relayed
    #[error("Image build failed: {0}")]
    Build(BuildFailure),

    /// Engine errors outside a build failure (connection, transport)
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Container run or output streaming failed
    #[error("Container run failed: {0}")]
    Run(#[source] EngineError),

    /// Pipeline exited non-zero inside the container
    #[error("Pipeline failed with exit code {code}")]
    PipelineFailed {
        /// Container exit code
        code: i64,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit code for this error: the pipeline's own code when it fits, else 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PipelineFailed { code } if (1..=255).contains(code) => *code as i32,
            _ => 1,
        }
    }
}
