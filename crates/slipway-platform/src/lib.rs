//! Slipway collaborator seams.
//!
//! The executor core never talks to the PaaS runtime, the secrets service,
//! or the execution log directly; it goes through the traits defined here.
//! The in-memory platform implementation backs tests and the offline
//! simulation binary.
//!
//! # Components
//!
//! - **`client`**: `PlatformClient` trait and per-call `CallConfig`
//! - **`memory`**: `InMemoryPlatform` fake with a recorded call journal
//! - **`secrets`**: `SecretsProvider` seam
//! - **`logsink`**: progress-line `LogSink` seam
//! - **`error`**: `PlatformError` taxonomy

pub mod client;
pub mod error;
pub mod logsink;
pub mod memory;
pub mod secrets;

pub use client::{AppDetail, CallConfig, CallConfigBuilder, PlatformClient, ReleaseApp};
pub use error::{PlatformError, PlatformResult};
pub use logsink::{LogSink, MemoryLogSink, TracingLogSink};
pub use memory::{InMemoryPlatform, PlatformSnapshot, SnapshotApp};
pub use secrets::{Credentials, PassthroughSecrets, SecretsProvider};
