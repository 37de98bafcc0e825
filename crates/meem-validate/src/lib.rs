//! Structural validation of mEEM configuration documents.
//!
//! [`validate_all`] is read-only and never stops at the first problem: it
//! returns every violation, in a stable order, so an editor can list them
//! and jump to the offending node. The load-time checks in [`precheck`] are
//! stricter and decide whether a decoded document may be used at all.

pub mod datamodel;
pub mod platform;
pub mod precheck;
pub mod report;

use meem_core::{DataModel, PlatformSettings};

pub use report::Violation;

/// Validate the documents of an editing session.
///
/// Platform rules run first and only when platform settings exist. A
/// missing data model yields a single violation.
pub fn validate_all(
    data_model: Option<&DataModel>,
    platform: Option<&PlatformSettings>,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    if let Some(ps) = platform {
        platform::validate_platform(ps, &mut violations);
    }

    match data_model {
        Some(dm) => datamodel::validate_data_model(dm, &mut violations),
        None => violations.push(Violation::global("No datamodel defined")),
    }

    tracing::debug!(count = violations.len(), "validation finished");
    violations
}
