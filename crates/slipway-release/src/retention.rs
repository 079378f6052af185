//! Retention cleanup for old releases.
//!
//! After a new release app is created, the releases already deployed for
//! the same prefix are pruned: releases with zero instances are deleted,
//! the newest non-zero release stays untouched, the next
//! `older_active_versions_to_keep - 1` are downsized to zero, and the rest
//! are deleted. Planning is pure; execution applies the plan serially with
//! per-release failure isolation.

use tracing::{info, warn};

use slipway_core::{Release, ResizeStep, RetentionPolicy};
use slipway_platform::{CallConfig, LogSink, PlatformClient};

/// Which releases retention will delete, downsize, and leave alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RetentionPlan {
    pub to_delete: Vec<Release>,
    pub to_downsize: Vec<Release>,
    /// The newest non-zero release, never touched.
    pub untouched: Option<Release>,
}

impl RetentionPlan {
    pub fn build(releases: &[Release], policy: &RetentionPolicy) -> Self {
        let policy = policy.clamped();
        let mut plan = RetentionPlan::default();

        let mut non_zero: Vec<Release> = Vec::new();
        for release in releases {
            if release.instances == 0 {
                plan.to_delete.push(release.clone());
            } else {
                non_zero.push(release.clone());
            }
        }

        non_zero.sort_by_key(|r| r.revision);
        plan.untouched = non_zero.pop();

        // Walk from second-newest down to oldest; the first keep-1 stay
        // active at zero instances, everything older goes away.
        let keep_downsized = (policy.older_active_versions_to_keep - 1) as usize;
        for (index, release) in non_zero.into_iter().rev().enumerate() {
            if index < keep_downsized {
                plan.to_downsize.push(release);
            } else {
                plan.to_delete.push(release);
            }
        }

        plan
    }
}

/// Result of applying a retention plan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RetentionOutcome {
    /// Releases actually deleted; failures are not counted.
    pub deleted: u32,
    /// Downsizes applied, recorded for the setup response.
    pub downsized: Vec<ResizeStep>,
    /// Releases whose delete or downsize failed and was skipped.
    pub failed: u32,
}

/// Apply a retention plan through the platform client.
///
/// Each release is one platform call. A failure on one release is logged
/// and does not stop processing of the remaining releases; retention is
/// best-effort cleanup and never escalates.
pub async fn execute<C: PlatformClient>(
    plan: &RetentionPlan,
    client: &C,
    log: &dyn LogSink,
    timeout_minutes: u64,
) -> RetentionOutcome {
    let mut outcome = RetentionOutcome::default();

    for release in &plan.to_delete {
        let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
        match client.delete_application(&release.name, &call).await {
            Ok(()) => {
                log.append(&format!("deleted old release {}", release.name));
                outcome.deleted += 1;
            }
            Err(e) => {
                warn!(release = %release.name, error = %e, "delete failed, continuing");
                log.append(&format!("delete of {} failed: {e}", release.name));
                outcome.failed += 1;
            }
        }
    }

    for release in &plan.to_downsize {
        let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
        match client.resize_application(&release.name, 0, &call).await {
            Ok(()) => {
                log.append(&format!("downsized old release {} to 0", release.name));
                outcome
                    .downsized
                    .push(ResizeStep::new(release.name.clone(), release.instances, 0));
            }
            Err(e) => {
                warn!(release = %release.name, error = %e, "downsize failed, continuing");
                log.append(&format!("downsize of {} failed: {e}", release.name));
                outcome.failed += 1;
            }
        }
    }

    info!(
        deleted = outcome.deleted,
        downsized = outcome.downsized.len(),
        failed = outcome.failed,
        "retention cleanup applied"
    );
    outcome
}
