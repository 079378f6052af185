//! In-memory platform fake.
//!
//! Plays the role for slipway tests that an in-memory state store plays in
//! an orchestrator's tests: every crate drives its algorithms against this
//! implementation. It keeps app/route/org/space tables, records a journal
//! of calls in issue order (for ordering assertions), and can be
//! programmed to fail or time out specific calls.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::{AppDetail, CallConfig, PlatformClient, ReleaseApp};
use crate::error::{PlatformError, PlatformResult};

#[derive(Debug, Clone, Default)]
struct AppRecord {
    instances: u32,
    routes: BTreeSet<String>,
    org: String,
    space: String,
    autoscaler_enabled: bool,
}

#[derive(Default)]
struct Inner {
    apps: BTreeMap<String, AppRecord>,
    organizations: Vec<String>,
    /// org -> space names
    spaces: BTreeMap<String, Vec<String>>,
    /// Routes created via `create_route`, plus all routes ever seeded.
    known_routes: BTreeSet<String>,
    /// Call journal, `op:arg[:arg...]` in issue order.
    journal: Vec<String>,
    /// Op keys that fail with an api error when hit.
    fail_keys: BTreeSet<String>,
    /// Op keys that fail with a timeout when hit.
    timeout_keys: BTreeSet<String>,
}

/// Seed data for an `InMemoryPlatform`, loadable from JSON.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlatformSnapshot {
    #[serde(default)]
    pub apps: Vec<SnapshotApp>,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub spaces: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotApp {
    pub name: String,
    pub instances: u32,
    #[serde(default)]
    pub routes: BTreeSet<String>,
    #[serde(default)]
    pub org: String,
    #[serde(default)]
    pub space: String,
    #[serde(default)]
    pub autoscaler_enabled: bool,
}

/// In-memory `PlatformClient` implementation.
#[derive(Default)]
pub struct InMemoryPlatform {
    inner: Mutex<Inner>,
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a platform pre-populated from a snapshot.
    pub fn from_snapshot(snapshot: PlatformSnapshot) -> Self {
        let platform = Self::new();
        {
            let mut inner = platform.inner.lock().unwrap();
            for app in snapshot.apps {
                inner.known_routes.extend(app.routes.iter().cloned());
                inner.apps.insert(
                    app.name,
                    AppRecord {
                        instances: app.instances,
                        routes: app.routes,
                        org: app.org,
                        space: app.space,
                        autoscaler_enabled: app.autoscaler_enabled,
                    },
                );
            }
            inner.organizations = snapshot.organizations;
            inner.spaces = snapshot.spaces;
        }
        platform
    }

    /// Seed one app with instances and routes.
    pub fn seed_app(&self, name: &str, instances: u32, routes: &[&str]) {
        let mut inner = self.inner.lock().unwrap();
        let routes: BTreeSet<String> = routes.iter().map(|r| r.to_string()).collect();
        inner.known_routes.extend(routes.iter().cloned());
        inner.apps.insert(
            name.to_string(),
            AppRecord {
                instances,
                routes,
                org: "org".to_string(),
                space: "space".to_string(),
                autoscaler_enabled: false,
            },
        );
    }

    pub fn seed_organizations(&self, orgs: &[&str]) {
        let mut inner = self.inner.lock().unwrap();
        inner.organizations = orgs.iter().map(|o| o.to_string()).collect();
    }

    pub fn seed_spaces(&self, org: &str, spaces: &[&str]) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .spaces
            .insert(org.to_string(), spaces.iter().map(|s| s.to_string()).collect());
    }

    pub fn set_autoscaler(&self, app: &str, enabled: bool) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(record) = inner.apps.get_mut(app) {
            record.autoscaler_enabled = enabled;
        }
    }

    /// Make the call identified by `op_key` (journal format, e.g.
    /// `"delete_application:shop-api__1"`) fail with an api error.
    pub fn fail_on(&self, op_key: &str) {
        self.inner.lock().unwrap().fail_keys.insert(op_key.to_string());
    }

    /// Make the call identified by `op_key` fail with a timeout.
    pub fn timeout_on(&self, op_key: &str) {
        self.inner
            .lock()
            .unwrap()
            .timeout_keys
            .insert(op_key.to_string());
    }

    /// The journal of calls issued so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().journal.clone()
    }

    pub fn instances_of(&self, app: &str) -> Option<u32> {
        self.inner.lock().unwrap().apps.get(app).map(|a| a.instances)
    }

    pub fn routes_of(&self, app: &str) -> Option<BTreeSet<String>> {
        self.inner.lock().unwrap().apps.get(app).map(|a| a.routes.clone())
    }

    pub fn autoscaler_enabled(&self, app: &str) -> Option<bool> {
        self.inner
            .lock()
            .unwrap()
            .apps
            .get(app)
            .map(|a| a.autoscaler_enabled)
    }

    pub fn app_exists(&self, app: &str) -> bool {
        self.inner.lock().unwrap().apps.contains_key(app)
    }

    /// Record the call and apply any programmed failure.
    fn admit(&self, inner: &mut Inner, op_key: String, call: &CallConfig) -> PlatformResult<()> {
        debug!(op = %op_key, "platform call");
        inner.journal.push(op_key.clone());
        if inner.timeout_keys.contains(&op_key) {
            return Err(PlatformError::Timeout {
                operation: op_key,
                minutes: call.timeout_minutes(),
            });
        }
        if inner.fail_keys.contains(&op_key) {
            return Err(PlatformError::Api(format!("programmed failure: {op_key}")));
        }
        Ok(())
    }
}

fn guid_for(name: &str) -> String {
    format!("guid-{name}")
}

fn detail(name: &str, record: &AppRecord) -> AppDetail {
    AppDetail {
        guid: guid_for(name),
        name: name.to_string(),
        org: record.org.clone(),
        space: record.space.clone(),
        instances: record.instances,
        routes: record.routes.clone(),
        instance_indices: (0..record.instances).collect(),
    }
}

impl PlatformClient for InMemoryPlatform {
    async fn get_application_by_name(
        &self,
        name: &str,
        call: &CallConfig,
    ) -> PlatformResult<AppDetail> {
        let mut inner = self.inner.lock().unwrap();
        self.admit(&mut inner, format!("get_application:{name}"), call)?;
        inner
            .apps
            .get(name)
            .map(|record| detail(name, record))
            .ok_or_else(|| PlatformError::NotFound(name.to_string()))
    }

    async fn create_application(
        &self,
        name: &str,
        instances: u32,
        call: &CallConfig,
    ) -> PlatformResult<AppDetail> {
        let mut inner = self.inner.lock().unwrap();
        self.admit(&mut inner, format!("create_application:{name}:{instances}"), call)?;
        if inner.apps.contains_key(name) {
            return Err(PlatformError::Api(format!("application exists: {name}")));
        }
        let record = AppRecord {
            instances,
            org: "org".to_string(),
            space: "space".to_string(),
            ..AppRecord::default()
        };
        let created = detail(name, &record);
        inner.apps.insert(name.to_string(), record);
        Ok(created)
    }

    async fn resize_application(
        &self,
        name: &str,
        instances: u32,
        call: &CallConfig,
    ) -> PlatformResult<()> {
        let mut inner = self.inner.lock().unwrap();
        self.admit(&mut inner, format!("resize_application:{name}:{instances}"), call)?;
        let record = inner
            .apps
            .get_mut(name)
            .ok_or_else(|| PlatformError::NotFound(name.to_string()))?;
        record.instances = instances;
        Ok(())
    }

    async fn upsize_with_steady_state_check(
        &self,
        name: &str,
        instances: u32,
        call: &CallConfig,
    ) -> PlatformResult<()> {
        let mut inner = self.inner.lock().unwrap();
        self.admit(&mut inner, format!("upsize_steady:{name}:{instances}"), call)?;
        let record = inner
            .apps
            .get_mut(name)
            .ok_or_else(|| PlatformError::NotFound(name.to_string()))?;
        record.instances = instances;
        Ok(())
    }

    async fn delete_application(&self, name: &str, call: &CallConfig) -> PlatformResult<()> {
        let mut inner = self.inner.lock().unwrap();
        self.admit(&mut inner, format!("delete_application:{name}"), call)?;
        inner
            .apps
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PlatformError::NotFound(name.to_string()))
    }

    async fn previous_releases(
        &self,
        prefix: &str,
        call: &CallConfig,
    ) -> PlatformResult<Vec<ReleaseApp>> {
        let mut inner = self.inner.lock().unwrap();
        self.admit(&mut inner, format!("previous_releases:{prefix}"), call)?;
        Ok(inner
            .apps
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, record)| ReleaseApp {
                name: name.clone(),
                instances: record.instances,
            })
            .collect())
    }

    async fn map_routes(
        &self,
        app: &str,
        routes: &BTreeSet<String>,
        call: &CallConfig,
    ) -> PlatformResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let joined = routes.iter().cloned().collect::<Vec<_>>().join(",");
        self.admit(&mut inner, format!("map_routes:{app}:{joined}"), call)?;
        inner.known_routes.extend(routes.iter().cloned());
        let record = inner
            .apps
            .get_mut(app)
            .ok_or_else(|| PlatformError::NotFound(app.to_string()))?;
        record.routes.extend(routes.iter().cloned());
        Ok(())
    }

    async fn unmap_routes(
        &self,
        app: &str,
        routes: &BTreeSet<String>,
        call: &CallConfig,
    ) -> PlatformResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let joined = routes.iter().cloned().collect::<Vec<_>>().join(",");
        self.admit(&mut inner, format!("unmap_routes:{app}:{joined}"), call)?;
        let record = inner
            .apps
            .get_mut(app)
            .ok_or_else(|| PlatformError::NotFound(app.to_string()))?;
        for route in routes {
            record.routes.remove(route);
        }
        Ok(())
    }

    async fn create_route(&self, route: &str, call: &CallConfig) -> PlatformResult<()> {
        let mut inner = self.inner.lock().unwrap();
        self.admit(&mut inner, format!("create_route:{route}"), call)?;
        inner.known_routes.insert(route.to_string());
        Ok(())
    }

    async fn organizations(&self, call: &CallConfig) -> PlatformResult<Vec<String>> {
        let mut inner = self.inner.lock().unwrap();
        self.admit(&mut inner, "organizations".to_string(), call)?;
        Ok(inner.organizations.clone())
    }

    async fn spaces(&self, org: &str, call: &CallConfig) -> PlatformResult<Vec<String>> {
        let mut inner = self.inner.lock().unwrap();
        self.admit(&mut inner, format!("spaces:{org}"), call)?;
        Ok(inner.spaces.get(org).cloned().unwrap_or_default())
    }

    async fn routes_in_space(
        &self,
        org: &str,
        space: &str,
        call: &CallConfig,
    ) -> PlatformResult<Vec<String>> {
        let mut inner = self.inner.lock().unwrap();
        self.admit(&mut inner, format!("routes:{org}:{space}"), call)?;
        Ok(inner.known_routes.iter().cloned().collect())
    }

    async fn set_autoscaler_enabled(
        &self,
        app: &str,
        enabled: bool,
        call: &CallConfig,
    ) -> PlatformResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        self.admit(&mut inner, format!("set_autoscaler:{app}:{enabled}"), call)?;
        let record = inner
            .apps
            .get_mut(app)
            .ok_or_else(|| PlatformError::NotFound(app.to_string()))?;
        let previous = record.autoscaler_enabled;
        record.autoscaler_enabled = enabled;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call() -> CallConfig {
        CallConfig::builder().timeout_minutes(1).build()
    }

    #[tokio::test]
    async fn create_resize_delete_lifecycle() {
        let platform = InMemoryPlatform::new();
        platform.create_application("api__0", 2, &call()).await.unwrap();
        platform.resize_application("api__0", 4, &call()).await.unwrap();
        assert_eq!(platform.instances_of("api__0"), Some(4));
        platform.delete_application("api__0", &call()).await.unwrap();
        assert!(!platform.app_exists("api__0"));
    }

    #[tokio::test]
    async fn journal_records_call_order() {
        let platform = InMemoryPlatform::new();
        platform.seed_app("api__0", 1, &[]);
        platform.resize_application("api__0", 0, &call()).await.unwrap();
        platform.delete_application("api__0", &call()).await.unwrap();
        assert_eq!(
            platform.calls(),
            vec!["resize_application:api__0:0", "delete_application:api__0"]
        );
    }

    #[tokio::test]
    async fn programmed_failure_hits_only_its_key() {
        let platform = InMemoryPlatform::new();
        platform.seed_app("a", 1, &[]);
        platform.seed_app("b", 1, &[]);
        platform.fail_on("delete_application:a");
        assert!(platform.delete_application("a", &call()).await.is_err());
        assert!(platform.delete_application("b", &call()).await.is_ok());
    }

    #[tokio::test]
    async fn timeout_carries_caller_minutes() {
        let platform = InMemoryPlatform::new();
        platform.seed_app("a", 1, &[]);
        platform.timeout_on("resize_application:a:3");
        let err = platform
            .resize_application("a", 3, &CallConfig::builder().timeout_minutes(9).build())
            .await
            .unwrap_err();
        match err {
            PlatformError::Timeout { minutes, .. } => assert_eq!(minutes, 9),
            other => panic!("expected timeout, got {other}"),
        }
    }

    #[tokio::test]
    async fn route_mapping_updates_membership() {
        let platform = InMemoryPlatform::new();
        platform.seed_app("api__1", 1, &["old.example.com"]);
        let routes: BTreeSet<String> = ["live.example.com".to_string()].into();
        platform.map_routes("api__1", &routes, &call()).await.unwrap();
        platform
            .unmap_routes("api__1", &["old.example.com".to_string()].into(), &call())
            .await
            .unwrap();
        assert_eq!(platform.routes_of("api__1").unwrap(), routes);
    }

    #[tokio::test]
    async fn created_routes_are_listed() {
        let platform = InMemoryPlatform::new();
        platform.create_route("new.example.com", &call()).await.unwrap();
        let routes = platform.routes_in_space("org", "space", &call()).await.unwrap();
        assert_eq!(routes, vec!["new.example.com"]);
    }

    #[tokio::test]
    async fn snapshot_seeds_tables() {
        let snapshot: PlatformSnapshot = serde_json::from_str(
            r#"{
                "apps": [{"name": "api__2", "instances": 3, "routes": ["r.example.com"]}],
                "organizations": ["acme"],
                "spaces": {"acme": ["dev", "prod"]}
            }"#,
        )
        .unwrap();
        let platform = InMemoryPlatform::from_snapshot(snapshot);
        assert_eq!(platform.instances_of("api__2"), Some(3));
        assert_eq!(
            platform.spaces("acme", &call()).await.unwrap(),
            vec!["dev", "prod"]
        );
    }
}
