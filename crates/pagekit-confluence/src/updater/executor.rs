//! Single update attempt.

use super::conflict::is_version_conflict;
use super::request::UpdatePayload;
use crate::error::ConfluenceError;
use crate::repository::PageRepository;
use crate::types::Page;

/// Result of one update attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The server accepted the write.
    Applied(Page),
    /// The expected version was stale.
    Conflict(ConfluenceError),
    /// Anything else went wrong.
    Failed(ConfluenceError),
}

/// Performs one update attempt against a [`PageRepository`].
pub struct UpdateExecutor<'a, R> {
    repository: &'a R,
}

impl<'a, R: PageRepository> UpdateExecutor<'a, R> {
    /// Create an executor over `repository`.
    #[must_use]
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// Submit `payload` once and classify the result.
    pub async fn attempt(&self, page_id: &str, payload: &UpdatePayload) -> AttemptOutcome {
        match self.repository.submit_update(page_id, payload).await {
            Ok(page) => AttemptOutcome::Applied(page),
            Err(err) if is_version_conflict(&err) => AttemptOutcome::Conflict(err),
            Err(err) => AttemptOutcome::Failed(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockFailure, MockRepository, fixture_page};
    use crate::updater::UpdateRequest;

    fn payload(expected_version: u32) -> UpdatePayload {
        let request = UpdateRequest::new("42", expected_version).unwrap();
        UpdatePayload::rebase(&request, &fixture_page("42", "OPS", "Runbook", 1), expected_version)
    }

    #[tokio::test]
    async fn test_attempt_applied() {
        let repo = MockRepository::new().with_page(fixture_page("42", "OPS", "Runbook", 1));
        let outcome = UpdateExecutor::new(&repo).attempt("42", &payload(1)).await;
        assert!(matches!(outcome, AttemptOutcome::Applied(page) if page.version.number == 2));
    }

    #[tokio::test]
    async fn test_attempt_stale_version_is_conflict() {
        let repo = MockRepository::new().with_page(fixture_page("42", "OPS", "Runbook", 5));
        let outcome = UpdateExecutor::new(&repo).attempt("42", &payload(1)).await;
        assert!(matches!(outcome, AttemptOutcome::Conflict(_)));
    }

    #[tokio::test]
    async fn test_attempt_server_error_is_failure() {
        let repo = MockRepository::new()
            .with_page(fixture_page("42", "OPS", "Runbook", 1))
            .fail_submit(1, MockFailure::ServerError);
        let outcome = UpdateExecutor::new(&repo).attempt("42", &payload(1)).await;
        assert!(matches!(
            outcome,
            AttemptOutcome::Failed(ConfluenceError::HttpResponse { status: 500, .. })
        ));
    }
}
