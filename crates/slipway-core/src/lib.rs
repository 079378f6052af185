//! Slipway domain model.
//!
//! Core types shared by every slipway crate: releases and their resize
//! steps, route sets, the command envelope/sum type, the uniform execution
//! response, and the slipway.toml configuration.
//!
//! # Components
//!
//! - **`types`**: Release, ResizeStep, RouteSet, RetentionPolicy, ResizeStrategy
//! - **`command`**: CommandEnvelope validation and the Command sum type
//! - **`response`**: ExecutionResponse and per-command payloads
//! - **`config`**: slipway.toml defaults

pub mod command;
pub mod config;
pub mod response;
pub mod types;

pub use command::{
    BlueGreenConfig, Command, CommandDecodeError, CommandEnvelope, CommandKind, DeployPayload,
    InstanceSyncPayload, ResourceDiscoveryPayload, ResourceQuery, RollbackPayload,
    RouteUpdatePayload, RunPluginPayload, SealedSecrets, SetupPayload, SimulatedRouteOp,
};
pub use config::{DefaultsConfig, SlipwayConfig};
pub use response::{
    DiscoveredResources, ExecutionResponse, ExecutionStatus, InstanceSyncOutcome,
    InstanceVerification, ResizeOutcome, ResponsePayload, SetupOutcome,
};
pub use types::{AppName, Release, ResizePhase, ResizeStep, ResizeStrategy, RetentionPolicy, RouteSet};
