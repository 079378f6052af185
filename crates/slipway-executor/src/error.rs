//! Executor error types.
//!
//! Failures in the primary path abort the command; the single conversion
//! into a response happens at the `Executor::execute` boundary. Best-effort
//! batch failures (retention cleanup) never appear here; they are logged
//! and counted where they happen.

use thiserror::Error;

use slipway_platform::PlatformError;
use slipway_release::ReleaseError;

pub type ExecutorResult<T> = Result<T, ExecutorError>;

#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Payload/command mismatch or a semantically impossible request;
    /// raised before any platform call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Release(#[from] ReleaseError),

    /// Scratch-directory or other local file-system failure.
    #[error("io failure: {0}")]
    UnrecoverableIo(#[from] std::io::Error),

    #[error("plugin failed: {0}")]
    Plugin(String),
}
