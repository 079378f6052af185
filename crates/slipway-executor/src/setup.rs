//! Setup command: create the next release and prune the old ones.

use tracing::warn;

use slipway_core::{Release, ResponsePayload, RetentionPolicy, SetupOutcome, SetupPayload};
use slipway_platform::{CallConfig, LogSink, PlatformClient};
use slipway_release::{RetentionPlan, conforming_releases, next_revision, release_name, retention};

use crate::error::ExecutorResult;

pub(crate) async fn run<C: PlatformClient>(
    client: &C,
    log: &dyn LogSink,
    payload: &SetupPayload,
    policy: RetentionPolicy,
    timeout_minutes: u64,
) -> ExecutorResult<(String, ResponsePayload)> {
    let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
    let apps = client.previous_releases(&payload.app_prefix, &call).await?;
    let (releases, skipped) = conforming_releases(&apps);
    if !skipped.is_empty() {
        warn!(prefix = %payload.app_prefix, ?skipped, "ignoring apps without a revision suffix");
    }

    let revision = next_revision(&releases);
    let name = release_name(&payload.app_prefix, revision);
    let total_previous: u32 = releases.iter().map(|r| r.instances).sum();

    log.append(&format!("creating release {name}"));
    let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
    let created = client
        .create_application(&name, payload.initial_instances, &call)
        .await;

    // Retention cleanup is best-effort and runs whether or not the create
    // succeeded; only afterwards does a create failure abort the command.
    let plan = RetentionPlan::build(&releases, &policy);
    let outcome = retention::execute(&plan, client, log, timeout_minutes).await;

    let created = created?;
    let new_release = Release {
        name: created.name,
        revision,
        instances: created.instances,
    };

    Ok((
        format!("created release {name} at revision {revision}"),
        ResponsePayload::Setup(SetupOutcome {
            new_release,
            total_previous_instance_count: total_previous,
            downsize_details: outcome.downsized,
            deleted_releases: outcome.deleted,
        }),
    ))
}
