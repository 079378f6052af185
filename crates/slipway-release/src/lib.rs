//! Slipway release tracking and retention.
//!
//! Revision numbers live in release names; this crate parses them,
//! computes the next revision for a prefix, and plans/applies the
//! bounded-history retention policy over old releases.
//!
//! # Components
//!
//! - **`version`**: revision parsing and next-revision computation
//! - **`retention`**: retention planning and best-effort execution

pub mod retention;
pub mod version;

pub use retention::{RetentionOutcome, RetentionPlan};
pub use version::{
    ReleaseError, ReleaseResult, conforming_releases, next_revision, parse_release, release_name,
    revision_of,
};
