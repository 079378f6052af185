//! Platform collaborator error types.

use thiserror::Error;

/// Result type alias for platform calls.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Errors surfaced by the platform client and secrets collaborators.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform api error: {0}")]
    Api(String),

    #[error("application not found: {0}")]
    NotFound(String),

    /// Expiry of the caller-supplied timeout is this call's failure,
    /// never a silent partial success.
    #[error("{operation} timed out after {minutes} minutes")]
    Timeout { operation: String, minutes: u64 },

    #[error("secret decryption failed: {0}")]
    Decrypt(String),
}
