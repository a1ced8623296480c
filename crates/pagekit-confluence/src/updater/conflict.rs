//! Version conflict classification.

use crate::error::ConfluenceError;

/// Whether `err` is the server rejecting a stale expected version.
///
/// Only the [`ConfluenceError::VersionConflict`] variant (HTTP 409) counts.
/// Message text is never inspected, so an unrelated error that happens to
/// mention "conflict" is not retried.
#[must_use]
pub fn is_version_conflict(err: &ConfluenceError) -> bool {
    matches!(err, ConfluenceError::VersionConflict { .. })
}
