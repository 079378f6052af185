//! The platform client seam.
//!
//! `PlatformClient` is the boundary between the deployment algorithms and
//! the PaaS runtime. Consumers are generic over an implementation; the
//! real HTTP client lives outside this workspace, and `InMemoryPlatform`
//! backs tests and offline simulation.
//!
//! Every call takes a `CallConfig` built fresh at the call site, so no
//! request configuration is ever shared or mutated between calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::PlatformResult;

/// Application details as the platform reports them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppDetail {
    pub guid: String,
    pub name: String,
    pub org: String,
    pub space: String,
    pub instances: u32,
    pub routes: BTreeSet<String>,
    pub instance_indices: Vec<u32>,
}

/// Name and instance count of one release app under a prefix. Revision
/// parsing is the release tracker's job, not the client's.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReleaseApp {
    pub name: String,
    pub instances: u32,
}

/// Immutable per-call options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallConfig {
    timeout: Duration,
}

impl CallConfig {
    pub fn builder() -> CallConfigBuilder {
        CallConfigBuilder::default()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn timeout_minutes(&self) -> u64 {
        self.timeout.as_secs() / 60
    }
}

/// Builder for `CallConfig`, constructed fresh at each call site.
#[derive(Debug, Clone)]
pub struct CallConfigBuilder {
    timeout_minutes: u64,
}

impl Default for CallConfigBuilder {
    fn default() -> Self {
        Self { timeout_minutes: 5 }
    }
}

impl CallConfigBuilder {
    pub fn timeout_minutes(mut self, minutes: u64) -> Self {
        self.timeout_minutes = minutes;
        self
    }

    pub fn build(self) -> CallConfig {
        CallConfig {
            timeout: Duration::from_secs(self.timeout_minutes * 60),
        }
    }
}

/// Calls the executor issues against the PaaS runtime.
///
/// Within one command every call is awaited before the next is issued;
/// implementations may assume no two calls for the same command are ever
/// in flight concurrently.
#[allow(async_fn_in_trait)]
pub trait PlatformClient {
    async fn get_application_by_name(
        &self,
        name: &str,
        call: &CallConfig,
    ) -> PlatformResult<AppDetail>;

    async fn create_application(
        &self,
        name: &str,
        instances: u32,
        call: &CallConfig,
    ) -> PlatformResult<AppDetail>;

    async fn resize_application(
        &self,
        name: &str,
        instances: u32,
        call: &CallConfig,
    ) -> PlatformResult<()>;

    /// Resize upward and wait until all requested instances report a
    /// steady running state.
    async fn upsize_with_steady_state_check(
        &self,
        name: &str,
        instances: u32,
        call: &CallConfig,
    ) -> PlatformResult<()>;

    async fn delete_application(&self, name: &str, call: &CallConfig) -> PlatformResult<()>;

    /// All apps whose names start with `prefix`.
    async fn previous_releases(
        &self,
        prefix: &str,
        call: &CallConfig,
    ) -> PlatformResult<Vec<ReleaseApp>>;

    async fn map_routes(
        &self,
        app: &str,
        routes: &BTreeSet<String>,
        call: &CallConfig,
    ) -> PlatformResult<()>;

    async fn unmap_routes(
        &self,
        app: &str,
        routes: &BTreeSet<String>,
        call: &CallConfig,
    ) -> PlatformResult<()>;

    async fn create_route(&self, route: &str, call: &CallConfig) -> PlatformResult<()>;

    async fn organizations(&self, call: &CallConfig) -> PlatformResult<Vec<String>>;

    async fn spaces(&self, org: &str, call: &CallConfig) -> PlatformResult<Vec<String>>;

    async fn routes_in_space(
        &self,
        org: &str,
        space: &str,
        call: &CallConfig,
    ) -> PlatformResult<Vec<String>>;

    /// Enable or disable the autoscaler attached to an app. Returns the
    /// state the autoscaler was in before this call.
    async fn set_autoscaler_enabled(
        &self,
        app: &str,
        enabled: bool,
        call: &CallConfig,
    ) -> PlatformResult<bool>;
}
