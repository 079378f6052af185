//! Deploy resize planning.
//!
//! A deploy step moves instances from the old releases to the new one in
//! two phases whose order depends on the configured strategy. The plan is
//! pure arithmetic over counts read from the platform; the orchestrator
//! executes the phases it names.

use serde::{Deserialize, Serialize};
use tracing::debug;

use slipway_core::{Release, ResizePhase, ResizeStep, ResizeStrategy};

/// Instance deltas and phase order for one deploy step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployResizePlan {
    /// Instances the new release gains (negative when it already runs
    /// more than the target).
    pub step_increase: i64,
    /// Aggregate instances the old releases give up in this step.
    pub step_decrease: i64,
    pub order: [ResizePhase; 2],
}

impl DeployResizePlan {
    pub fn build(
        new_release: &Release,
        update_count_target: u32,
        old_releases: &[Release],
        downsize_count_target: u32,
        total_previous_at_setup: u32,
        strategy: ResizeStrategy,
    ) -> Self {
        let step_increase = i64::from(update_count_target) - i64::from(new_release.instances);

        let old_sum: i64 = old_releases
            .iter()
            .filter(|r| r.name != new_release.name)
            .map(|r| i64::from(r.instances))
            .sum();
        // How much of the downsize target earlier steps already consumed.
        let already_removed = i64::from(total_previous_at_setup) - old_sum;
        let step_decrease = i64::from(downsize_count_target) - already_removed;

        let plan = Self {
            step_increase,
            step_decrease,
            order: strategy.phases(),
        };
        debug!(
            new_release = %new_release.name,
            step_increase,
            step_decrease,
            ?strategy,
            "deploy resize planned"
        );
        plan
    }
}

/// The single resize step the upsize phase applies to the new release.
/// `None` when the new release already runs at the target.
pub fn upsize_step(new_release: &Release, update_count_target: u32) -> Option<ResizeStep> {
    if new_release.instances == update_count_target {
        return None;
    }
    Some(ResizeStep::new(
        new_release.name.clone(),
        new_release.instances,
        update_count_target,
    ))
}

/// Spread the aggregate decrease across the old releases, oldest first,
/// never taking an app below zero.
pub fn downsize_steps(
    old_releases: &[Release],
    new_release_name: &str,
    step_decrease: i64,
) -> Vec<ResizeStep> {
    let mut remaining = step_decrease.max(0) as u32;
    let mut steps = Vec::new();

    let mut old: Vec<&Release> = old_releases
        .iter()
        .filter(|r| r.name != new_release_name)
        .collect();
    old.sort_by_key(|r| r.revision);

    for release in old {
        if remaining == 0 {
            break;
        }
        if release.instances == 0 {
            continue;
        }
        let removed = release.instances.min(remaining);
        steps.push(ResizeStep::new(
            release.name.clone(),
            release.instances,
            release.instances - removed,
        ));
        remaining -= removed;
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(name: &str, revision: u64, instances: u32) -> Release {
        Release {
            name: name.to_string(),
            revision,
            instances,
        }
    }

    #[test]
    fn first_step_takes_full_deltas() {
        // New release at 0 instances with target 4, old releases summing
        // to 5 with nothing removed yet.
        let new_release = release("svc__4", 4, 0);
        let old = vec![release("svc__2", 2, 2), release("svc__3", 3, 3)];
        let plan = DeployResizePlan::build(
            &new_release,
            4,
            &old,
            4,
            5,
            ResizeStrategy::DownsizeOldFirst,
        );
        assert_eq!(plan.step_increase, 4);
        assert_eq!(plan.step_decrease, 4);
        assert_eq!(plan.order, [ResizePhase::Downsize, ResizePhase::Upsize]);
    }

    #[test]
    fn decrease_accounts_for_already_removed() {
        // Setup saw 6 old instances; a previous step already removed 2,
        // so a downsize target of 4 has 2 left to remove.
        let new_release = release("svc__4", 4, 2);
        let old = vec![release("svc__3", 3, 4)];
        let plan = DeployResizePlan::build(
            &new_release,
            4,
            &old,
            4,
            6,
            ResizeStrategy::UpsizeNewFirst,
        );
        assert_eq!(plan.step_decrease, 2);
        assert_eq!(plan.order, [ResizePhase::Upsize, ResizePhase::Downsize]);
    }

    #[test]
    fn old_sum_excludes_the_new_release() {
        let new_release = release("svc__4", 4, 3);
        let old = vec![release("svc__4", 4, 3), release("svc__3", 3, 5)];
        let plan = DeployResizePlan::build(
            &new_release,
            6,
            &old,
            5,
            5,
            ResizeStrategy::DownsizeOldFirst,
        );
        // old_sum = 5, nothing removed yet.
        assert_eq!(plan.step_decrease, 5);
        assert_eq!(plan.step_increase, 3);
    }

    #[test]
    fn upsize_step_skips_noop() {
        assert_eq!(upsize_step(&release("svc__4", 4, 4), 4), None);
        assert_eq!(
            upsize_step(&release("svc__4", 4, 1), 4),
            Some(ResizeStep::new("svc__4", 1, 4))
        );
    }

    #[test]
    fn downsize_consumes_oldest_first() {
        let old = vec![
            release("svc__3", 3, 3),
            release("svc__1", 1, 2),
            release("svc__2", 2, 1),
        ];
        let steps = downsize_steps(&old, "svc__4", 4);
        assert_eq!(
            steps,
            vec![
                ResizeStep::new("svc__1", 2, 0),
                ResizeStep::new("svc__2", 1, 0),
                ResizeStep::new("svc__3", 3, 2),
            ]
        );
    }

    #[test]
    fn downsize_never_goes_negative() {
        let old = vec![release("svc__1", 1, 2)];
        let steps = downsize_steps(&old, "svc__4", 10);
        assert_eq!(steps, vec![ResizeStep::new("svc__1", 2, 0)]);
    }

    #[test]
    fn non_positive_decrease_produces_no_steps() {
        let old = vec![release("svc__1", 1, 2)];
        assert!(downsize_steps(&old, "svc__4", 0).is_empty());
        assert!(downsize_steps(&old, "svc__4", -3).is_empty());
    }
}
