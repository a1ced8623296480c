//! Result types for page update operations.

use crate::types::Page;

/// Result of a successful page update.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    /// Page as stored after the update.
    pub page: Page,
    /// Version the successful write was based on.
    pub previous_version: u32,
    /// Version assigned by the server.
    pub current_version: u32,
    /// Changes relative to the page as first fetched.
    pub changes: Vec<String>,
    /// One-line summary.
    pub message: String,
    /// Submit attempts made, including the successful one.
    pub attempts: u32,
}

impl UpdateOutcome {
    pub(crate) fn summary(page: &Page, previous_version: u32, changes: &[String]) -> String {
        let detail = if changes.is_empty() {
            "no field changes".to_owned()
        } else {
            format!("{} change(s)", changes.len())
        };
        format!(
            "Updated \"{}\" from version {} to {} ({detail})",
            page.title, previous_version, page.version.number
        )
    }
}

/// Result of a dry-run update (no changes made).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRunResult {
    /// Current page title.
    pub current_title: String,
    /// Current page version.
    pub current_version: u32,
    /// Version the request expects to be current.
    pub expected_version: u32,
    /// Changes the update would make.
    pub changes: Vec<String>,
}

impl DryRunResult {
    /// Whether the request's expected version is already stale, meaning a
    /// real update would go through at least one conflict retry.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.expected_version != self.current_version
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::repository::fixture_page;

    #[test]
    fn test_summary_with_changes() {
        let page = fixture_page("42", "OPS", "Runbook", 3);
        let changes = vec!["Content updated".to_owned()];
        assert_eq!(
            UpdateOutcome::summary(&page, 2, &changes),
            "Updated \"Runbook\" from version 2 to 3 (1 change(s))"
        );
    }

    #[test]
    fn test_summary_without_changes() {
        let page = fixture_page("42", "OPS", "Runbook", 2);
        assert_eq!(
            UpdateOutcome::summary(&page, 1, &[]),
            "Updated \"Runbook\" from version 1 to 2 (no field changes)"
        );
    }

    #[test]
    fn test_dry_run_staleness() {
        let mut result = DryRunResult {
            current_title: "Runbook".to_owned(),
            current_version: 4,
            expected_version: 4,
            changes: Vec::new(),
        };
        assert!(!result.is_stale());
        result.expected_version = 3;
        assert!(result.is_stale());
    }
}
