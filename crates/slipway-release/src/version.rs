//! Release revision tracking.
//!
//! A release name carries its revision as a trailing numeric token
//! (`shop-api__4`). The next revision for a prefix is one past the highest
//! revision currently deployed, or 0 when nothing is deployed yet.

use regex::Regex;
use thiserror::Error;

use slipway_core::Release;
use slipway_platform::ReleaseApp;

pub type ReleaseResult<T> = Result<T, ReleaseError>;

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("release name has no numeric revision suffix: {0}")]
    Revision(String),

    #[error("revision pattern error: {0}")]
    Pattern(String),
}

/// Extract the trailing numeric token of a release name.
///
/// Callers listing platform apps must filter non-conforming names before
/// relying on this; see `conforming_releases`.
pub fn revision_of(name: &str) -> ReleaseResult<u64> {
    let pattern = Regex::new(r"(\d+)$").map_err(|e| ReleaseError::Pattern(e.to_string()))?;
    let caps = pattern
        .captures(name.trim())
        .ok_or_else(|| ReleaseError::Revision(name.to_string()))?;
    caps[1]
        .parse()
        .map_err(|_| ReleaseError::Revision(name.to_string()))
}

/// Parse one platform app into a release.
pub fn parse_release(app: &ReleaseApp) -> ReleaseResult<Release> {
    Ok(Release {
        name: app.name.clone(),
        revision: revision_of(&app.name)?,
        instances: app.instances,
    })
}

/// Split platform apps into parsed releases and the names that carry no
/// revision suffix (and therefore take no part in revision tracking or
/// retention).
pub fn conforming_releases(apps: &[ReleaseApp]) -> (Vec<Release>, Vec<String>) {
    let mut releases = Vec::new();
    let mut skipped = Vec::new();
    for app in apps {
        match parse_release(app) {
            Ok(release) => releases.push(release),
            Err(_) => skipped.push(app.name.clone()),
        }
    }
    (releases, skipped)
}

/// Revision for the next release of this prefix.
pub fn next_revision(releases: &[Release]) -> u64 {
    releases
        .iter()
        .map(|r| r.revision)
        .max()
        .map_or(0, |highest| highest + 1)
}

/// Name for a new release at the given revision.
pub fn release_name(prefix: &str, revision: u64) -> String {
    format!("{prefix}{revision}")
}
