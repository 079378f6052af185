//! Route-update command: blue-green swaps, forward and rollback.

use slipway_core::{ResponsePayload, RouteUpdatePayload};
use slipway_platform::{CallConfig, LogSink, PlatformClient};
use slipway_routes::{
    rollback_swap_superfluous, route_assignment, simulated_blue_green, standard_blue_green,
    swap_needed,
};

use crate::error::{ExecutorError, ExecutorResult};

pub(crate) async fn run<C: PlatformClient>(
    client: &C,
    log: &dyn LogSink,
    payload: &RouteUpdatePayload,
    timeout_minutes: u64,
) -> ExecutorResult<(String, ResponsePayload)> {
    if !swap_needed(payload.blue_green.as_ref()) {
        log.append("route swap not required");
        return Ok(("route swap skipped".to_string(), ResponsePayload::Empty));
    }
    let cfg = payload
        .blue_green
        .as_ref()
        .ok_or_else(|| ExecutorError::InvalidArgument("route update without config".to_string()))?;

    if cfg.routes.standard_blue_green {
        if cfg.routes.rollback {
            let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
            let current = client
                .get_application_by_name(&cfg.new_app_name, &call)
                .await?
                .routes;
            let target = route_assignment(true, &cfg.routes).map;
            if rollback_swap_superfluous(&current, &target) {
                log.append(&format!(
                    "{} already holds its rollback routes, swap skipped",
                    cfg.new_app_name
                ));
                return Ok((
                    "rollback route swap not needed".to_string(),
                    ResponsePayload::Empty,
                ));
            }
        }
        standard_blue_green(client, log, cfg, timeout_minutes).await?;
    } else {
        let op = cfg.simulated_op.ok_or_else(|| {
            ExecutorError::InvalidArgument(
                "simulated blue-green requires a map or unmap operation".to_string(),
            )
        })?;
        simulated_blue_green(client, log, cfg, op, timeout_minutes).await?;
    }

    Ok(("route update complete".to_string(), ResponsePayload::Empty))
}
