//! Slipway route-swap coordination.
//!
//! Computes and applies the route map/unmap sets for standard and
//! simulated blue-green transitions, in both the forward-deploy and
//! rollback directions, coordinating old-app resize and autoscaler
//! suspension around the swap.

pub mod swap;

pub use swap::{
    RouteAssignment, rollback_swap_superfluous, route_assignment, simulated_blue_green,
    standard_blue_green, swap_needed,
};
