//! Rollback reconciliation of recorded instance deltas.
//!
//! A forward deploy records one `ResizeStep` per app it touched. Rolling
//! back partitions those deltas into the apps that need an upsize and the
//! apps that need a downsize; no-op entries drop out. The orchestrator
//! applies the two lists in the order the configured strategy dictates.

use slipway_core::ResizeStep;

/// The two resize lists a rollback works through.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RollbackPartition {
    /// Apps whose desired count exceeds their previous count.
    pub upsize: Vec<ResizeStep>,
    /// Apps whose desired count is below their previous count.
    pub downsize: Vec<ResizeStep>,
}

pub fn partition(instance_data: &[ResizeStep]) -> RollbackPartition {
    let mut partitioned = RollbackPartition::default();
    for step in instance_data {
        if step.desired_count > step.previous_count {
            partitioned.upsize.push(step.clone());
        } else if step.desired_count < step.previous_count {
            partitioned.downsize.push(step.clone());
        }
        // Equal counts are a no-op and take no part in the rollback.
    }
    partitioned
}
