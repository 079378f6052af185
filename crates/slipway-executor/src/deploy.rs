//! Deploy and rollback commands: phased instance resizing.

use std::collections::BTreeSet;

use slipway_core::{
    DeployPayload, InstanceVerification, Release, ResizeOutcome, ResizePhase, ResizeStep,
    ResizeStrategy, ResponsePayload, RollbackPayload,
};
use slipway_platform::{CallConfig, LogSink, PlatformClient};
use slipway_release::{conforming_releases, revision_of};
use slipway_resize::{DeployResizePlan, downsize_steps, partition, upsize_step};

use crate::error::{ExecutorError, ExecutorResult};

async fn apply_step<C: PlatformClient>(
    client: &C,
    log: &dyn LogSink,
    step: &ResizeStep,
    timeout_minutes: u64,
) -> ExecutorResult<()> {
    let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
    client
        .resize_application(&step.app_name, step.desired_count, &call)
        .await?;
    log.append(&format!(
        "resized {} from {} to {}",
        step.app_name, step.previous_count, step.desired_count
    ));
    Ok(())
}

fn outcome(deltas: Vec<ResizeStep>) -> ResizeOutcome {
    let verification = deltas
        .iter()
        .map(|d| InstanceVerification {
            app_name: d.app_name.clone(),
            expected_instances: d.desired_count,
        })
        .collect();
    ResizeOutcome {
        instance_deltas: deltas,
        instance_elements_for_verification: verification,
    }
}

/// Forward deploy: move instances from the old releases to the new one,
/// phase order per strategy. The recorded deltas become the rollback's
/// input.
pub(crate) async fn deploy<C: PlatformClient>(
    client: &C,
    log: &dyn LogSink,
    payload: &DeployPayload,
    strategy: ResizeStrategy,
    timeout_minutes: u64,
) -> ExecutorResult<(String, ResponsePayload)> {
    // The target must itself carry a revision suffix; reject before any
    // platform call if it does not.
    revision_of(&payload.new_release_name)?;

    let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
    let apps = client.previous_releases(&payload.app_prefix, &call).await?;
    let (releases, _) = conforming_releases(&apps);

    let new_release = releases
        .iter()
        .find(|r| r.name == payload.new_release_name)
        .cloned()
        .ok_or_else(|| {
            ExecutorError::InvalidArgument(format!(
                "new release not deployed: {}",
                payload.new_release_name
            ))
        })?;
    let old_releases: Vec<Release> = releases
        .into_iter()
        .filter(|r| r.name != new_release.name)
        .collect();

    let plan = DeployResizePlan::build(
        &new_release,
        payload.update_count_target,
        &old_releases,
        payload.downsize_count_target,
        payload.total_previous_instance_count,
        strategy,
    );

    let mut deltas = Vec::new();
    for phase in plan.order {
        match phase {
            ResizePhase::Downsize => {
                for step in downsize_steps(&old_releases, &new_release.name, plan.step_decrease) {
                    apply_step(client, log, &step, timeout_minutes).await?;
                    deltas.push(step);
                }
            }
            ResizePhase::Upsize => {
                if let Some(step) = upsize_step(&new_release, payload.update_count_target) {
                    apply_step(client, log, &step, timeout_minutes).await?;
                    deltas.push(step);
                }
            }
        }
    }

    Ok((
        format!("deploy resize applied for {}", new_release.name),
        ResponsePayload::Resize(outcome(deltas)),
    ))
}

/// Rollback: apply the recorded deltas in the reverse flow. Apps being
/// upsized are re-mapped to the current routes before they grow.
pub(crate) async fn rollback<C: PlatformClient>(
    client: &C,
    log: &dyn LogSink,
    payload: &RollbackPayload,
    strategy: ResizeStrategy,
    timeout_minutes: u64,
) -> ExecutorResult<(String, ResponsePayload)> {
    let partitioned = partition(&payload.instance_data);
    let routes: BTreeSet<String> = payload.routes.iter().cloned().collect();

    let mut deltas = Vec::new();
    for phase in strategy.phases() {
        match phase {
            ResizePhase::Downsize => {
                for step in &partitioned.downsize {
                    apply_step(client, log, step, timeout_minutes).await?;
                    deltas.push(step.clone());
                }
            }
            ResizePhase::Upsize => {
                for step in &partitioned.upsize {
                    if !routes.is_empty() {
                        let call =
                            CallConfig::builder().timeout_minutes(timeout_minutes).build();
                        client.map_routes(&step.app_name, &routes, &call).await?;
                        log.append(&format!("re-mapped routes on {}", step.app_name));
                    }
                    apply_step(client, log, step, timeout_minutes).await?;
                    deltas.push(step.clone());
                }
            }
        }
    }

    Ok((
        "rollback resize applied".to_string(),
        ResponsePayload::Resize(outcome(deltas)),
    ))
}
