//! Version-refresh retry loop.
//!
//! When the server rejects an update because the expected version is stale,
//! the controller waits, re-fetches the page, rebases the request onto the
//! fresh snapshot and tries again:
//!
//! ```text
//! Attempting --applied--------------------------> Succeeded
//! Attempting --conflict, attempt < max----------> Conflicted
//! Attempting --conflict, attempt == max---------> RetriesExhausted
//! Attempting --other failure--------------------> Repository (no retry)
//! Conflicted --sleep(attempt * base_delay)------> Refreshing
//! Refreshing --fetched--------------------------> Attempting
//! Refreshing --404------------------------------> NotFound
//! ```
//!
//! Fetch and submit calls are strictly sequential, so attempt `n + 1` is
//! always based on a version at least as new as the one that conflicted in
//! attempt `n`.

use std::time::Duration;

use tracing::{debug, warn};

use super::error::UpdateError;
use super::executor::{AttemptOutcome, UpdateExecutor};
use super::request::{UpdatePayload, UpdateRequest};
use crate::repository::PageRepository;
use crate::types::Page;

/// Retry policy for version conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total submit attempts, including the first. Values below 1 act as 1.
    pub max_attempts: u32,
    /// Linear backoff unit: after the `n`-th conflict the controller waits
    /// `n * base_delay` before refreshing.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    /// Delay before refreshing after the `attempt`-th conflict.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Successful update produced by the controller.
#[derive(Debug, Clone)]
pub struct AppliedUpdate {
    /// Page as returned by the server after the write.
    pub page: Page,
    /// Version the successful attempt was based on.
    pub based_on: u32,
    /// Number of submit attempts made, including the successful one.
    pub attempts: u32,
}

/// Drives update attempts until one is applied or the budget runs out.
pub struct RetryController<'a, R> {
    repository: &'a R,
    executor: UpdateExecutor<'a, R>,
    config: RetryConfig,
}

impl<'a, R: PageRepository> RetryController<'a, R> {
    /// Create a controller over `repository`.
    #[must_use]
    pub fn new(repository: &'a R, config: RetryConfig) -> Self {
        Self {
            repository,
            executor: UpdateExecutor::new(repository),
            config,
        }
    }

    /// Apply `request`, starting from `snapshot` and the request's expected
    /// version.
    ///
    /// Only version conflicts are retried. Any other failure is returned
    /// immediately as [`UpdateError::Repository`].
    ///
    /// # Errors
    ///
    /// - [`UpdateError::RetriesExhausted`] if every attempt conflicted
    /// - [`UpdateError::NotFound`] if the page disappeared during a refresh
    /// - [`UpdateError::Repository`] for any other remote failure
    pub async fn run(
        &self,
        request: &UpdateRequest,
        snapshot: &Page,
    ) -> Result<AppliedUpdate, UpdateError> {
        let page_id = request.page_id();
        let max_attempts = self.config.max_attempts.max(1);
        let mut payload = UpdatePayload::rebase(request, snapshot, request.expected_version());
        let mut attempt = 1;

        loop {
            match self.executor.attempt(page_id, &payload).await {
                AttemptOutcome::Applied(page) => {
                    if page.version.number != payload.next_version() {
                        warn!(
                            page_id,
                            stored = page.version.number,
                            expected = payload.next_version(),
                            "Server assigned an unexpected version"
                        );
                    }
                    return Ok(AppliedUpdate {
                        page,
                        based_on: payload.expected_version,
                        attempts: attempt,
                    });
                }
                AttemptOutcome::Failed(source) => {
                    return Err(UpdateError::Repository {
                        page_id: page_id.to_owned(),
                        source,
                    });
                }
                AttemptOutcome::Conflict(source) => {
                    if attempt >= max_attempts {
                        warn!(page_id, attempts = attempt, "Giving up after version conflicts");
                        return Err(UpdateError::RetriesExhausted {
                            page_id: page_id.to_owned(),
                            attempts: attempt,
                            source,
                        });
                    }

                    let delay = self.config.delay_after(attempt);
                    warn!(
                        page_id,
                        attempt,
                        max_attempts,
                        based_on = payload.expected_version,
                        delay = ?delay,
                        "Version conflict, retrying"
                    );
                    tokio::time::sleep(delay).await;

                    let refreshed = self
                        .repository
                        .fetch_page(page_id)
                        .await
                        .map_err(|e| UpdateError::from_fetch(page_id, e))?;
                    debug!(page_id, version = refreshed.version.number, "Refreshed page");

                    payload = UpdatePayload::rebase(request, &refreshed, refreshed.version.number);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ConfluenceError;
    use crate::repository::{MockFailure, MockRepository, fixture_page};

    fn no_delay(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    async fn run(
        repo: &MockRepository,
        request: &UpdateRequest,
        config: RetryConfig,
    ) -> Result<AppliedUpdate, UpdateError> {
        let snapshot = repo.page(request.page_id()).unwrap();
        RetryController::new(repo, config).run(request, &snapshot).await
    }

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.base_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_delay_is_linear() {
        let config = RetryConfig {
            max_attempts: 5,
            base_delay: Duration::from_millis(250),
        };
        assert_eq!(config.delay_after(1), Duration::from_millis(250));
        assert_eq!(config.delay_after(2), Duration::from_millis(500));
        assert_eq!(config.delay_after(4), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_first_attempt_success_skips_refresh() {
        let repo = MockRepository::new().with_page(fixture_page("42", "OPS", "Runbook", 1));
        let request = UpdateRequest::new("42", 1).unwrap().with_content("<p>v2</p>");

        let applied = run(&repo, &request, no_delay(3)).await.unwrap();

        assert_eq!(applied.attempts, 1);
        assert_eq!(applied.based_on, 1);
        assert_eq!(applied.page.version.number, 2);
        assert_eq!(repo.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_always_conflicting_exhausts_budget() {
        let repo = MockRepository::new()
            .with_page(fixture_page("42", "OPS", "Runbook", 1))
            .always_conflict();
        let request = UpdateRequest::new("42", 1).unwrap();

        let err = run(&repo, &request, no_delay(3)).await.unwrap_err();

        assert!(matches!(
            err,
            UpdateError::RetriesExhausted {
                attempts: 3,
                source: ConfluenceError::VersionConflict { .. },
                ..
            }
        ));
        assert_eq!(repo.submit_count(), 3);
        assert_eq!(repo.fetch_count(), 2);
        assert!(err.to_string().contains("after 3 attempt(s)"));
    }

    #[tokio::test]
    async fn test_custom_budget_is_respected() {
        let repo = MockRepository::new()
            .with_page(fixture_page("42", "OPS", "Runbook", 1))
            .always_conflict();
        let request = UpdateRequest::new("42", 1).unwrap();

        let err = run(&repo, &request, no_delay(5)).await.unwrap_err();

        assert!(matches!(err, UpdateError::RetriesExhausted { attempts: 5, .. }));
        assert_eq!(repo.submit_count(), 5);
        assert_eq!(repo.fetch_count(), 4);
    }

    #[tokio::test]
    async fn test_zero_budget_still_attempts_once() {
        let repo = MockRepository::new()
            .with_page(fixture_page("42", "OPS", "Runbook", 1))
            .always_conflict();
        let request = UpdateRequest::new("42", 1).unwrap();

        let err = run(&repo, &request, no_delay(0)).await.unwrap_err();

        assert!(matches!(err, UpdateError::RetriesExhausted { attempts: 1, .. }));
        assert_eq!(repo.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_recovers_after_one_conflict() {
        let repo = MockRepository::new().with_page(fixture_page("42", "OPS", "Runbook", 1));
        let request = UpdateRequest::new("42", 1).unwrap().with_title("Runbook v2");
        let snapshot = repo.page("42").unwrap();
        repo.concurrent_edit("42");

        let applied = RetryController::new(&repo, no_delay(3))
            .run(&request, &snapshot)
            .await
            .unwrap();

        assert_eq!(applied.attempts, 2);
        assert_eq!(applied.based_on, 2);
        assert_eq!(applied.page.version.number, 3);
        assert_eq!(repo.fetch_count(), 1);

        let submitted = repo.submitted();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0].expected_version, 1);
        assert_eq!(submitted[1].expected_version, 2);
        assert_eq!(submitted[1].title, "Runbook v2");
    }

    #[tokio::test]
    async fn test_retry_rebases_unset_fields_on_refreshed_snapshot() {
        let repo = MockRepository::new().with_page(fixture_page("42", "OPS", "Runbook", 1));
        let snapshot = repo.page("42").unwrap();

        // Another editor renames the page before our first attempt lands.
        let other = UpdateRequest::new("42", 1).unwrap().with_title("Renamed");
        RetryController::new(&repo, no_delay(1))
            .run(&other, &snapshot)
            .await
            .unwrap();

        let ours = UpdateRequest::new("42", 1).unwrap().with_content("<p>ours</p>");
        let applied = RetryController::new(&repo, no_delay(3))
            .run(&ours, &snapshot)
            .await
            .unwrap();

        assert_eq!(applied.page.title, "Renamed");
        assert_eq!(applied.page.content(), "<p>ours</p>");
    }

    #[tokio::test]
    async fn test_network_failure_is_not_retried() {
        let repo = MockRepository::new()
            .with_page(fixture_page("42", "OPS", "Runbook", 1))
            .fail_submit(1, MockFailure::Network);
        let request = UpdateRequest::new("42", 1).unwrap();

        let err = run(&repo, &request, no_delay(3)).await.unwrap_err();

        assert!(matches!(
            err,
            UpdateError::Repository {
                source: ConfluenceError::Io(_),
                ..
            }
        ));
        assert_eq!(repo.submit_count(), 1);
        assert_eq!(repo.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_server_error_mentioning_conflict_is_not_retried() {
        let repo = MockRepository::new()
            .with_page(fixture_page("42", "OPS", "Runbook", 1))
            .fail_submit(1, MockFailure::ServerError);
        let request = UpdateRequest::new("42", 1).unwrap();

        let err = run(&repo, &request, no_delay(3)).await.unwrap_err();

        assert!(matches!(err, UpdateError::Repository { .. }));
        assert_eq!(repo.submit_count(), 1);
    }

    #[tokio::test]
    async fn test_page_deleted_during_refresh() {
        let repo = MockRepository::new()
            .with_page(fixture_page("42", "OPS", "Runbook", 1))
            .always_conflict()
            .fail_fetch(1, MockFailure::NotFound);
        let request = UpdateRequest::new("42", 1).unwrap();

        let err = run(&repo, &request, no_delay(3)).await.unwrap_err();

        assert!(matches!(err, UpdateError::NotFound { ref page_id } if page_id == "42"));
        assert_eq!(repo.submit_count(), 1);
        assert_eq!(repo.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_network_failure_is_repository_error() {
        let repo = MockRepository::new()
            .with_page(fixture_page("42", "OPS", "Runbook", 1))
            .always_conflict()
            .fail_fetch(1, MockFailure::Network);
        let request = UpdateRequest::new("42", 1).unwrap();

        let err = run(&repo, &request, no_delay(3)).await.unwrap_err();

        assert!(matches!(err, UpdateError::Repository { .. }));
        assert_eq!(repo.submit_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_linearly() {
        let repo = MockRepository::new()
            .with_page(fixture_page("42", "OPS", "Runbook", 1))
            .always_conflict();
        let request = UpdateRequest::new("42", 1).unwrap();
        let config = RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        };

        let started = tokio::time::Instant::now();
        let err = run(&repo, &request, config).await.unwrap_err();

        assert!(matches!(err, UpdateError::RetriesExhausted { .. }));
        // 1 * 1000ms after the first conflict, 2 * 1000ms after the second.
        assert_eq!(started.elapsed(), Duration::from_millis(3000));
    }
}
