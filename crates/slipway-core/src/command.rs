//! Command model: the envelope received from the dispatch layer and the
//! exhaustive command sum type the executor works with.
//!
//! The outer scheduler delivers a `CommandEnvelope` carrying a declared
//! kind and an untyped payload. `CommandEnvelope::decode` checks that the
//! payload matches the declared kind and produces a `Command`; a mismatch
//! fails before any platform call is made.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ResizeStep, ResizeStrategy, RetentionPolicy, RouteSet};

/// The seven command kinds the executor accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Setup,
    Deploy,
    Rollback,
    RouteUpdate,
    ResourceDiscovery,
    RunPlugin,
    InstanceSync,
}

/// Opaque encrypted credential blob, decrypted once per command by the
/// secrets collaborator before any platform call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SealedSecrets {
    pub ciphertext: String,
}

/// Wire form of a command as delivered by the dispatch layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub kind: CommandKind,
    /// Per-call platform timeout in minutes; falls back to the configured
    /// default when absent.
    pub timeout_minutes: Option<u64>,
    pub credentials: Option<SealedSecrets>,
    /// Kind-specific payload, validated against `kind` by `decode`.
    pub payload: serde_json::Value,
}

/// Raised when an envelope's payload does not match its declared kind.
#[derive(Debug, Error)]
#[error("payload does not match command kind {kind:?}: {message}")]
pub struct CommandDecodeError {
    pub kind: CommandKind,
    pub message: String,
}

impl CommandEnvelope {
    /// Validate the payload against the declared kind.
    pub fn decode(&self) -> Result<Command, CommandDecodeError> {
        let err = |e: serde_json::Error| CommandDecodeError {
            kind: self.kind,
            message: e.to_string(),
        };
        let payload = self.payload.clone();
        let command = match self.kind {
            CommandKind::Setup => Command::Setup(serde_json::from_value(payload).map_err(err)?),
            CommandKind::Deploy => Command::Deploy(serde_json::from_value(payload).map_err(err)?),
            CommandKind::Rollback => {
                Command::Rollback(serde_json::from_value(payload).map_err(err)?)
            }
            CommandKind::RouteUpdate => {
                Command::RouteUpdate(serde_json::from_value(payload).map_err(err)?)
            }
            CommandKind::ResourceDiscovery => {
                Command::ResourceDiscovery(serde_json::from_value(payload).map_err(err)?)
            }
            CommandKind::RunPlugin => {
                Command::RunPlugin(serde_json::from_value(payload).map_err(err)?)
            }
            CommandKind::InstanceSync => {
                Command::InstanceSync(serde_json::from_value(payload).map_err(err)?)
            }
        };
        Ok(command)
    }
}

/// A fully validated command, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Setup(SetupPayload),
    Deploy(DeployPayload),
    Rollback(RollbackPayload),
    RouteUpdate(RouteUpdatePayload),
    ResourceDiscovery(ResourceDiscoveryPayload),
    RunPlugin(RunPluginPayload),
    InstanceSync(InstanceSyncPayload),
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Setup(_) => CommandKind::Setup,
            Command::Deploy(_) => CommandKind::Deploy,
            Command::Rollback(_) => CommandKind::Rollback,
            Command::RouteUpdate(_) => CommandKind::RouteUpdate,
            Command::ResourceDiscovery(_) => CommandKind::ResourceDiscovery,
            Command::RunPlugin(_) => CommandKind::RunPlugin,
            Command::InstanceSync(_) => CommandKind::InstanceSync,
        }
    }
}

// ── Payloads ───────────────────────────────────────────────────────

/// Setup: create the next release app and clean up old releases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetupPayload {
    /// Release name prefix; the new app is named `<prefix><revision>`.
    pub app_prefix: String,
    /// Instance count the new release app is created with.
    pub initial_instances: u32,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    pub retention: Option<RetentionPolicy>,
}

/// Deploy: phased resize of the new release against the old ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeployPayload {
    pub app_prefix: String,
    pub new_release_name: String,
    /// Instance count the new release should reach in this step.
    pub update_count_target: u32,
    /// Aggregate instance count the old releases should have given up by
    /// the end of this step.
    pub downsize_count_target: u32,
    /// Sum of old-release instances recorded when setup ran.
    pub total_previous_instance_count: u32,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    pub strategy: Option<ResizeStrategy>,
}

/// Rollback: undo the instance deltas recorded during a forward deploy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RollbackPayload {
    /// Per-app deltas captured during the forward deploy.
    pub instance_data: Vec<ResizeStep>,
    /// Current route set, re-mapped onto any app being upsized before it
    /// is resized.
    #[serde(default)]
    pub routes: Vec<String>,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    pub strategy: Option<ResizeStrategy>,
}

/// Which direct route operation a simulated blue-green update performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulatedRouteOp {
    Map,
    Unmap,
}

/// Everything the route-swap coordinator needs for one transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlueGreenConfig {
    pub new_app_name: String,
    /// Apps currently holding the production routes.
    #[serde(default)]
    pub existing_app_names: Vec<String>,
    pub routes: RouteSet,
    /// Rollback requested but explicitly suppressed by the caller.
    #[serde(default)]
    pub skip_rollback: bool,
    /// Forward deploys only: downsize the old app to zero after the swap.
    #[serde(default)]
    pub downsize_old: bool,
    pub old_app_name: Option<String>,
    /// Instance count the old app had before the deploy downsized it,
    /// restored during rollback.
    pub old_app_initial_instances: Option<u32>,
    #[serde(default)]
    pub old_app_was_downsized: bool,
    /// An autoscaler is attached to the old app and must be suspended
    /// around manual resizes.
    #[serde(default)]
    pub autoscaler_attached: bool,
    /// Operation for simulated blue-green; ignored for standard.
    pub simulated_op: Option<SimulatedRouteOp>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteUpdatePayload {
    pub blue_green: Option<BlueGreenConfig>,
}

/// Which platform resources a discovery command lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "resource", rename_all = "snake_case")]
pub enum ResourceQuery {
    Organizations,
    Spaces { org: String },
    Routes { org: String, space: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceDiscoveryPayload {
    #[serde(flatten)]
    pub query: ResourceQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunPluginPayload {
    pub plugin: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstanceSyncPayload {
    pub app_name: String,
}
