//! Resource discovery and instance sync commands.

use slipway_core::{
    DiscoveredResources, InstanceSyncOutcome, InstanceSyncPayload, ResourceDiscoveryPayload,
    ResourceQuery, ResponsePayload,
};
use slipway_platform::{CallConfig, PlatformClient};

use crate::error::ExecutorResult;

pub(crate) async fn discover<C: PlatformClient>(
    client: &C,
    payload: &ResourceDiscoveryPayload,
    timeout_minutes: u64,
) -> ExecutorResult<(String, ResponsePayload)> {
    let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
    let (summary, resources) = match &payload.query {
        ResourceQuery::Organizations => {
            let organizations = client.organizations(&call).await?;
            (
                format!("{} organizations", organizations.len()),
                DiscoveredResources::Organizations { organizations },
            )
        }
        ResourceQuery::Spaces { org } => {
            let spaces = client.spaces(org, &call).await?;
            (
                format!("{} spaces in {org}", spaces.len()),
                DiscoveredResources::Spaces { spaces },
            )
        }
        ResourceQuery::Routes { org, space } => {
            let route_maps = client.routes_in_space(org, space, &call).await?;
            (
                format!("{} routes in {org}/{space}", route_maps.len()),
                DiscoveredResources::RouteMaps { route_maps },
            )
        }
    };
    Ok((summary, ResponsePayload::Discovery(resources)))
}

pub(crate) async fn instance_sync<C: PlatformClient>(
    client: &C,
    payload: &InstanceSyncPayload,
    timeout_minutes: u64,
) -> ExecutorResult<(String, ResponsePayload)> {
    let call = CallConfig::builder().timeout_minutes(timeout_minutes).build();
    let app = client
        .get_application_by_name(&payload.app_name, &call)
        .await?;
    Ok((
        format!("{} running {} instances", app.name, app.instances),
        ResponsePayload::InstanceSync(InstanceSyncOutcome {
            guid: app.guid,
            name: app.name,
            org: app.org,
            space: app.space,
            instance_indices: app.instance_indices,
        }),
    ))
}
