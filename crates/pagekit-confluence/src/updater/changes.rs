//! Human-readable change summary.

use super::request::UpdateRequest;
use crate::types::Page;

/// Describe what `request` changes relative to `before`.
///
/// Entries follow a fixed order (title, content, status). Fields the request
/// leaves unset, or sets to the current value, produce no entry.
#[must_use]
pub fn track_changes(request: &UpdateRequest, before: &Page) -> Vec<String> {
    let mut changes = Vec::new();

    if let Some(title) = request.title()
        && title != before.title
    {
        changes.push(format!(
            "Title changed from \"{}\" to \"{title}\"",
            before.title
        ));
    }

    if let Some(content) = request.content()
        && content != before.content()
    {
        changes.push("Content updated".to_owned());
    }

    if let Some(status) = request.status()
        && status != before.status
    {
        changes.push(format!(
            "Status changed from \"{}\" to \"{status}\"",
            before.status
        ));
    }

    changes
}
