//! Blue-green route-swap coordination.
//!
//! A standard blue-green cutover moves the new app from its temporary
//! routes onto the final routes while the existing apps take the mirror
//! image; rollback runs the same transition with the directions flipped.
//! The coordinator also restores a downsized old app before a rollback
//! swap and downsizes it after a forward swap, suspending an attached
//! autoscaler around any manual resize.

use std::collections::BTreeSet;

use tracing::{debug, info};

use slipway_core::{BlueGreenConfig, RouteSet, SimulatedRouteOp};
use slipway_platform::{CallConfig, LogSink, PlatformClient, PlatformResult};

/// Route sets to map and unmap on one application in one phase.
///
/// The two sets are disjoint by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAssignment {
    pub map: BTreeSet<String>,
    pub unmap: BTreeSet<String>,
}

impl RouteAssignment {
    /// The mirror-image assignment applied to the apps on the other side
    /// of the cutover.
    pub fn mirrored(&self) -> RouteAssignment {
        RouteAssignment {
            map: self.unmap.clone(),
            unmap: self.map.clone(),
        }
    }
}

/// Compute the new app's assignment for one transition. Forward deploys
/// map the final routes and release the temporary ones; rollback maps the
/// temporary routes back and releases the finals.
pub fn route_assignment(rollback: bool, routes: &RouteSet) -> RouteAssignment {
    let (map, mut unmap) = if rollback {
        (routes.temp_routes.clone(), routes.final_routes.clone())
    } else {
        (routes.final_routes.clone(), routes.temp_routes.clone())
    };
    // A route present in both sets stays mapped.
    for route in &map {
        unmap.remove(route);
    }
    RouteAssignment { map, unmap }
}

/// Whether this command needs a route swap at all.
pub fn swap_needed(config: Option<&BlueGreenConfig>) -> bool {
    match config {
        None => false,
        Some(cfg) if !cfg.routes.rollback => true,
        Some(cfg) => !cfg.skip_rollback,
    }
}

/// Rollback-only heuristic: when the app still holds every route the
/// rollback would map back, the forward swap is taken to have never
/// happened and the rollback swap is skipped. Routes added out of band
/// between deploy and rollback also satisfy this check and suppress the
/// swap.
pub fn rollback_swap_superfluous(
    current_routes: &BTreeSet<String>,
    rollback_target: &BTreeSet<String>,
) -> bool {
    !rollback_target.is_empty() && rollback_target.is_subset(current_routes)
}

async fn apply_assignment<C: PlatformClient>(
    client: &C,
    app: &str,
    assignment: &RouteAssignment,
    timeout_minutes: u64,
) -> PlatformResult<()> {
    if !assignment.map.is_empty() {
        let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
        client.map_routes(app, &assignment.map, &call).await?;
    }
    if !assignment.unmap.is_empty() {
        let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
        client.unmap_routes(app, &assignment.unmap, &call).await?;
    }
    Ok(())
}

/// Run a standard blue-green transition: restore the old app first on
/// rollback, swap routes on the new and existing apps, downsize the old
/// app last on a forward deploy.
pub async fn standard_blue_green<C: PlatformClient>(
    client: &C,
    log: &dyn LogSink,
    cfg: &BlueGreenConfig,
    timeout_minutes: u64,
) -> PlatformResult<()> {
    let rollback = cfg.routes.rollback;

    if rollback && cfg.old_app_was_downsized {
        if let (Some(old), Some(initial)) = (&cfg.old_app_name, cfg.old_app_initial_instances) {
            log.append(&format!("restoring {old} to {initial} instances"));
            let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
            client
                .upsize_with_steady_state_check(old, initial, &call)
                .await?;
            // Re-enable only once the resize has succeeded, or the
            // autoscaler would fight the restore.
            if cfg.autoscaler_attached {
                let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
                client.set_autoscaler_enabled(old, true, &call).await?;
                log.append(&format!("autoscaler re-enabled on {old}"));
            }
        }
    }

    let assignment = route_assignment(rollback, &cfg.routes);
    debug!(
        app = %cfg.new_app_name,
        map = assignment.map.len(),
        unmap = assignment.unmap.len(),
        rollback,
        "swapping routes"
    );
    apply_assignment(client, &cfg.new_app_name, &assignment, timeout_minutes).await?;
    log.append(&format!("routes swapped on {}", cfg.new_app_name));

    let mirrored = assignment.mirrored();
    for app in &cfg.existing_app_names {
        apply_assignment(client, app, &mirrored, timeout_minutes).await?;
        log.append(&format!("routes swapped on {app}"));
    }

    if !rollback && cfg.downsize_old {
        if let Some(old) = &cfg.old_app_name {
            if cfg.autoscaler_attached {
                let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
                client.set_autoscaler_enabled(old, false, &call).await?;
                log.append(&format!("autoscaler disabled on {old}"));
            }
            let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
            client.resize_application(old, 0, &call).await?;
            log.append(&format!("downsized {old} to 0"));
        }
    }

    info!(app = %cfg.new_app_name, rollback, "blue-green transition complete");
    Ok(())
}

/// Simulated blue-green: map or unmap the final routes directly on each
/// existing app, with no temp-route indirection.
pub async fn simulated_blue_green<C: PlatformClient>(
    client: &C,
    log: &dyn LogSink,
    cfg: &BlueGreenConfig,
    op: SimulatedRouteOp,
    timeout_minutes: u64,
) -> PlatformResult<()> {
    for app in &cfg.existing_app_names {
        let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
        match op {
            SimulatedRouteOp::Map => {
                client.map_routes(app, &cfg.routes.final_routes, &call).await?;
                log.append(&format!("mapped final routes on {app}"));
            }
            SimulatedRouteOp::Unmap => {
                client
                    .unmap_routes(app, &cfg.routes.final_routes, &call)
                    .await?;
                log.append(&format!("unmapped final routes on {app}"));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slipway_platform::{InMemoryPlatform, MemoryLogSink};

    fn routes(finals: &[&str], temps: &[&str], rollback: bool) -> RouteSet {
        RouteSet {
            final_routes: finals.iter().map(|r| r.to_string()).collect(),
            temp_routes: temps.iter().map(|r| r.to_string()).collect(),
            standard_blue_green: true,
            rollback,
        }
    }

    fn config(rollback: bool) -> BlueGreenConfig {
        BlueGreenConfig {
            new_app_name: "shop__2".to_string(),
            existing_app_names: vec!["shop__1".to_string()],
            routes: routes(&["live.example.com"], &["temp.example.com"], rollback),
            skip_rollback: false,
            downsize_old: false,
            old_app_name: Some("shop__1".to_string()),
            old_app_initial_instances: Some(3),
            old_app_was_downsized: false,
            autoscaler_attached: false,
            simulated_op: None,
        }
    }

    #[test]
    fn forward_assignment_maps_finals() {
        let assignment = route_assignment(false, &routes(&["f1", "f2"], &["t1"], false));
        assert_eq!(assignment.map, ["f1".to_string(), "f2".to_string()].into());
        assert_eq!(assignment.unmap, ["t1".to_string()].into());
    }

    #[test]
    fn rollback_assignment_maps_temps() {
        let assignment = route_assignment(true, &routes(&["f1"], &["t1"], true));
        assert_eq!(assignment.map, ["t1".to_string()].into());
        assert_eq!(assignment.unmap, ["f1".to_string()].into());
    }

    #[test]
    fn assignment_sets_are_disjoint() {
        // A route listed both as final and temp stays mapped.
        let assignment = route_assignment(false, &routes(&["shared", "f1"], &["shared", "t1"], false));
        assert!(assignment.map.contains("shared"));
        assert!(!assignment.unmap.contains("shared"));
    }

    #[test]
    fn mirrored_flips_sets() {
        let assignment = route_assignment(false, &routes(&["f1"], &["t1"], false));
        let mirrored = assignment.mirrored();
        assert_eq!(mirrored.map, assignment.unmap);
        assert_eq!(mirrored.unmap, assignment.map);
    }

    #[test]
    fn swap_needed_rules() {
        assert!(!swap_needed(None));
        let forward = config(false);
        assert!(swap_needed(Some(&forward)));
        let mut back = config(true);
        assert!(swap_needed(Some(&back)));
        back.skip_rollback = true;
        assert!(!swap_needed(Some(&back)));
    }

    #[test]
    fn superfluous_when_target_still_held() {
        let current: BTreeSet<String> = ["t1".to_string(), "x".to_string()].into();
        let target: BTreeSet<String> = ["t1".to_string()].into();
        assert!(rollback_swap_superfluous(&current, &target));
        let missing: BTreeSet<String> = ["t2".to_string()].into();
        assert!(!rollback_swap_superfluous(&current, &missing));
        assert!(!rollback_swap_superfluous(&current, &BTreeSet::new()));
    }

    #[tokio::test]
    async fn forward_then_rollback_restores_route_membership() {
        let platform = InMemoryPlatform::new();
        platform.seed_app("shop__2", 2, &["temp.example.com"]);
        platform.seed_app("shop__1", 3, &["live.example.com"]);
        let log = MemoryLogSink::new();

        let before_new = platform.routes_of("shop__2").unwrap();
        let before_old = platform.routes_of("shop__1").unwrap();

        let forward = config(false);
        standard_blue_green(&platform, &log, &forward, 5).await.unwrap();
        assert_eq!(
            platform.routes_of("shop__2").unwrap(),
            ["live.example.com".to_string()].into()
        );
        assert_eq!(
            platform.routes_of("shop__1").unwrap(),
            ["temp.example.com".to_string()].into()
        );

        let mut back = forward.clone();
        back.routes.rollback = true;
        standard_blue_green(&platform, &log, &back, 5).await.unwrap();
        assert_eq!(platform.routes_of("shop__2").unwrap(), before_new);
        assert_eq!(platform.routes_of("shop__1").unwrap(), before_old);
    }

    #[tokio::test]
    async fn forward_downsizes_old_after_swap() {
        let platform = InMemoryPlatform::new();
        platform.seed_app("shop__2", 2, &["temp.example.com"]);
        platform.seed_app("shop__1", 3, &["live.example.com"]);
        platform.set_autoscaler("shop__1", true);
        let log = MemoryLogSink::new();

        let mut cfg = config(false);
        cfg.downsize_old = true;
        cfg.autoscaler_attached = true;
        standard_blue_green(&platform, &log, &cfg, 5).await.unwrap();

        assert_eq!(platform.instances_of("shop__1"), Some(0));
        assert_eq!(platform.autoscaler_enabled("shop__1"), Some(false));

        // Autoscaler goes quiet before the resize, and both happen after
        // the route calls.
        let calls = platform.calls();
        let disable = calls
            .iter()
            .position(|c| c == "set_autoscaler:shop__1:false")
            .unwrap();
        let resize = calls
            .iter()
            .position(|c| c == "resize_application:shop__1:0")
            .unwrap();
        let last_route = calls
            .iter()
            .rposition(|c| c.starts_with("map_routes") || c.starts_with("unmap_routes"))
            .unwrap();
        assert!(last_route < disable);
        assert!(disable < resize);
    }

    #[tokio::test]
    async fn rollback_restores_old_before_routes_and_reenables_autoscaler_after_resize() {
        let platform = InMemoryPlatform::new();
        platform.seed_app("shop__2", 2, &["live.example.com"]);
        platform.seed_app("shop__1", 0, &["temp.example.com"]);
        let log = MemoryLogSink::new();

        let mut cfg = config(true);
        cfg.old_app_was_downsized = true;
        cfg.autoscaler_attached = true;
        standard_blue_green(&platform, &log, &cfg, 5).await.unwrap();

        assert_eq!(platform.instances_of("shop__1"), Some(3));
        assert_eq!(platform.autoscaler_enabled("shop__1"), Some(true));

        let calls = platform.calls();
        let restore = calls
            .iter()
            .position(|c| c == "upsize_steady:shop__1:3")
            .unwrap();
        let reenable = calls
            .iter()
            .position(|c| c == "set_autoscaler:shop__1:true")
            .unwrap();
        let first_route = calls
            .iter()
            .position(|c| c.starts_with("map_routes") || c.starts_with("unmap_routes"))
            .unwrap();
        assert!(restore < reenable);
        assert!(reenable < first_route);
    }

    #[tokio::test]
    async fn simulated_maps_finals_directly() {
        let platform = InMemoryPlatform::new();
        platform.seed_app("shop__1", 1, &[]);
        let log = MemoryLogSink::new();

        let mut cfg = config(false);
        cfg.existing_app_names = vec!["shop__1".to_string()];
        simulated_blue_green(&platform, &log, &cfg, SimulatedRouteOp::Map, 5)
            .await
            .unwrap();
        assert_eq!(
            platform.routes_of("shop__1").unwrap(),
            ["live.example.com".to_string()].into()
        );

        simulated_blue_green(&platform, &log, &cfg, SimulatedRouteOp::Unmap, 5)
            .await
            .unwrap();
        assert!(platform.routes_of("shop__1").unwrap().is_empty());
        // No temp-route indirection in simulated mode.
        assert!(
            platform
                .calls()
                .iter()
                .all(|c| !c.contains("temp.example.com"))
        );
    }
}
