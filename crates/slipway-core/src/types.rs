//! Domain types for versioned-release deployments.
//!
//! These types describe releases, instance-count changes, and route sets
//! as the executor sees them. They are read fresh from the platform at the
//! start of each command and discarded once a response is produced; nothing
//! here is cached between commands.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name of an application on the target platform.
pub type AppName = String;

// ── Releases ───────────────────────────────────────────────────────

/// One immutable deployed release of an application.
///
/// The revision is carried as a numeric suffix on the application name
/// (`shop-api__4`). Releases for a given prefix are totally ordered by
/// revision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Release {
    pub name: AppName,
    /// Revision parsed from the name suffix.
    pub revision: u64,
    /// Instance count as last read from the platform.
    pub instances: u32,
}

/// Instance-count change applied to one application during a deploy.
///
/// The list of steps recorded during a forward deploy is the input to the
/// rollback reconciliation, so both counts must survive serialization
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResizeStep {
    pub app_name: AppName,
    pub previous_count: u32,
    pub desired_count: u32,
}

impl ResizeStep {
    pub fn new(app_name: impl Into<AppName>, previous_count: u32, desired_count: u32) -> Self {
        Self {
            app_name: app_name.into(),
            previous_count,
            desired_count,
        }
    }

    /// True when the step does not change the instance count.
    pub fn is_noop(&self) -> bool {
        self.previous_count == self.desired_count
    }
}

// ── Routes ─────────────────────────────────────────────────────────

/// Route sets for a blue-green cutover.
///
/// Ordered sets keep the platform call order deterministic across runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RouteSet {
    /// Routes that carry production traffic after the cutover.
    pub final_routes: BTreeSet<String>,
    /// Temporary routes held by the new release during the cutover.
    pub temp_routes: BTreeSet<String>,
    /// Standard blue-green (temp-route indirection) vs. simulated.
    pub standard_blue_green: bool,
    /// Whether this route set describes the rollback direction.
    pub rollback: bool,
}

// ── Retention ──────────────────────────────────────────────────────

/// How many recent non-zero-instance releases stay active when old
/// releases are cleaned up during setup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub older_active_versions_to_keep: u32,
}

impl RetentionPolicy {
    pub fn new(older_active_versions_to_keep: u32) -> Self {
        Self {
            older_active_versions_to_keep,
        }
    }

    /// The policy is meaningless below one kept version; clamp rather
    /// than reject, since the value arrives from remote configuration.
    pub fn clamped(self) -> Self {
        Self {
            older_active_versions_to_keep: self.older_active_versions_to_keep.max(1),
        }
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            older_active_versions_to_keep: 3,
        }
    }
}

// ── Resize strategy ────────────────────────────────────────────────

/// Ordering rule between old-release downsizing and new-release upsizing
/// during a phased rollout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeStrategy {
    DownsizeOldFirst,
    UpsizeNewFirst,
}

impl Default for ResizeStrategy {
    fn default() -> Self {
        Self::DownsizeOldFirst
    }
}

/// One of the two resize phases executed during a deploy or rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizePhase {
    Downsize,
    Upsize,
}

impl ResizeStrategy {
    /// Phase execution order for this strategy.
    pub fn phases(self) -> [ResizePhase; 2] {
        match self {
            Self::DownsizeOldFirst => [ResizePhase::Downsize, ResizePhase::Upsize],
            Self::UpsizeNewFirst => [ResizePhase::Upsize, ResizePhase::Downsize],
        }
    }
}
