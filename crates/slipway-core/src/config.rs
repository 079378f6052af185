//! slipway.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::ResizeStrategy;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SlipwayConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Fallback values applied when a command envelope leaves them out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Platform call timeout in minutes.
    pub call_timeout_minutes: u64,
    /// Non-zero releases kept active by retention cleanup.
    pub older_active_versions_to_keep: u32,
    pub resize_strategy: ResizeStrategy,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            call_timeout_minutes: 5,
            older_active_versions_to_keep: 3,
            resize_strategy: ResizeStrategy::DownsizeOldFirst,
        }
    }
}

impl SlipwayConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: SlipwayConfig = toml::from_str(&content)?;
        // A keep-count below one would delete the newest release.
        config.defaults.older_active_versions_to_keep =
            config.defaults.older_active_versions_to_keep.max(1);
        Ok(config)
    }
}
