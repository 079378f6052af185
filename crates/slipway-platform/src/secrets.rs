//! Secrets decryption seam.
//!
//! Credentials arrive sealed inside the command envelope and are decrypted
//! exactly once per command, before the first platform call. The actual
//! decryption mechanism lives with the calling platform; slipway only
//! carries the seam and a passthrough used by tests and offline simulation.

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, PlatformResult};
use slipway_core::SealedSecrets;

/// Decrypted connection credentials for the target platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub endpoint: String,
    pub username: String,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub space: Option<String>,
}

pub trait SecretsProvider {
    fn decrypt(&self, sealed: &SealedSecrets) -> PlatformResult<Credentials>;
}

/// Treats the ciphertext as plain JSON credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSecrets;

impl SecretsProvider for PassthroughSecrets {
    fn decrypt(&self, sealed: &SealedSecrets) -> PlatformResult<Credentials> {
        serde_json::from_str(&sealed.ciphertext).map_err(|e| PlatformError::Decrypt(e.to_string()))
    }
}
