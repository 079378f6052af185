//! Response model: the uniform result value returned for every command.
//!
//! No error crosses the command boundary. The executor converts failures
//! into a `FAILURE` response with the causing message, because the only
//! channel back to the calling scheduler is a response message.

use serde::{Deserialize, Serialize};

use crate::types::{Release, ResizeStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Success,
    Failure,
}

/// Uniform response returned for every command execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionResponse {
    pub status: ExecutionStatus,
    /// Human-readable summary or failure message.
    pub output: String,
    pub payload: ResponsePayload,
}

impl ExecutionResponse {
    pub fn success(output: impl Into<String>, payload: ResponsePayload) -> Self {
        Self {
            status: ExecutionStatus::Success,
            output: output.into(),
            payload,
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Failure,
            output: output.into(),
            payload: ResponsePayload::Empty,
        }
    }
}

/// Command-specific response payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    /// Status-only commands (route update, plugin run, failures).
    Empty,
    Setup(SetupOutcome),
    /// Shared by deploy and rollback.
    Resize(ResizeOutcome),
    Discovery(DiscoveredResources),
    InstanceSync(InstanceSyncOutcome),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetupOutcome {
    pub new_release: Release,
    /// Sum of old-release instances at setup time; consumed later by the
    /// deploy resize math.
    pub total_previous_instance_count: u32,
    /// Downsizes applied by retention cleanup.
    pub downsize_details: Vec<ResizeStep>,
    /// Releases actually deleted; failed deletions are not counted.
    pub deleted_releases: u32,
}

/// Expected post-resize instance count for one app, checked by the
/// verification step that follows a deploy or rollback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceVerification {
    pub app_name: String,
    pub expected_instances: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResizeOutcome {
    /// Per-app deltas applied in this command, in call order. For a
    /// deploy these become the rollback's `instance_data`.
    pub instance_deltas: Vec<ResizeStep>,
    pub instance_elements_for_verification: Vec<InstanceVerification>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscoveredResources {
    Organizations { organizations: Vec<String> },
    Spaces { spaces: Vec<String> },
    RouteMaps { route_maps: Vec<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceSyncOutcome {
    pub guid: String,
    pub name: String,
    pub org: String,
    pub space: String,
    pub instance_indices: Vec<u32>,
}
