//! Page updater implementation.

use tracing::{debug, info};

use super::changes::track_changes;
use super::error::UpdateError;
use super::request::UpdateRequest;
use super::result::{DryRunResult, UpdateOutcome};
use super::retry::{RetryConfig, RetryController};
use crate::repository::PageRepository;
use crate::types::Page;

/// Updates pages with optimistic concurrency.
pub struct PageUpdater<'a, R> {
    repository: &'a R,
    config: RetryConfig,
}

impl<'a, R: PageRepository> PageUpdater<'a, R> {
    /// Create a new page updater.
    #[must_use]
    pub fn new(repository: &'a R, config: RetryConfig) -> Self {
        Self { repository, config }
    }

    /// Apply `request`, retrying on version conflicts.
    ///
    /// This method:
    /// 1. Fetches the current page
    /// 2. Rejects a rename onto another page's title in the same space
    /// 3. Submits the update, refreshing and retrying on version conflicts
    /// 4. Summarizes changes against the page as first fetched
    ///
    /// # Errors
    ///
    /// - [`UpdateError::NotFound`] if the page does not exist
    /// - [`UpdateError::Validation`] if the new title belongs to another page
    /// - [`UpdateError::RetriesExhausted`] if every attempt conflicted
    /// - [`UpdateError::Repository`] for any other remote failure
    pub async fn update(&self, request: &UpdateRequest) -> Result<UpdateOutcome, UpdateError> {
        let page_id = request.page_id();
        let original = self.fetch(page_id).await?;
        self.check_rename(request, &original).await?;

        let applied = RetryController::new(self.repository, self.config)
            .run(request, &original)
            .await?;

        let changes = track_changes(request, &original);
        let message = UpdateOutcome::summary(&applied.page, applied.based_on, &changes);
        info!(
            page_id,
            version = applied.page.version.number,
            attempts = applied.attempts,
            "Page updated"
        );

        Ok(UpdateOutcome {
            current_version: applied.page.version.number,
            previous_version: applied.based_on,
            page: applied.page,
            changes,
            message,
            attempts: applied.attempts,
        })
    }

    /// Perform a dry-run update (no changes made).
    ///
    /// Runs the same fetch and rename check as [`update`](Self::update) and
    /// reports what would change, without submitting anything.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::NotFound`] if the page does not exist
    /// - [`UpdateError::Validation`] if the new title belongs to another page
    /// - [`UpdateError::Repository`] for any other remote failure
    pub async fn dry_run(&self, request: &UpdateRequest) -> Result<DryRunResult, UpdateError> {
        let current = self.fetch(request.page_id()).await?;
        self.check_rename(request, &current).await?;

        Ok(DryRunResult {
            changes: track_changes(request, &current),
            current_title: current.title,
            current_version: current.version.number,
            expected_version: request.expected_version(),
        })
    }

    async fn fetch(&self, page_id: &str) -> Result<Page, UpdateError> {
        self.repository
            .fetch_page(page_id)
            .await
            .map_err(|e| UpdateError::from_fetch(page_id, e))
    }

    async fn check_rename(&self, request: &UpdateRequest, current: &Page) -> Result<(), UpdateError> {
        let Some(title) = request.title().filter(|t| *t != current.title) else {
            return Ok(());
        };
        let Some(space_key) = current.space_key() else {
            debug!(page_id = %current.id, "Page has no space, skipping title check");
            return Ok(());
        };

        let existing = self
            .repository
            .find_page_by_title(space_key, title)
            .await
            .map_err(|source| UpdateError::Repository {
                page_id: current.id.clone(),
                source,
            })?;

        match existing {
            Some(other) if other.id != current.id => Err(UpdateError::Validation(format!(
                "page \"{title}\" already exists in space {space_key} (id {})",
                other.id
            ))),
            _ => Ok(()),
        }
    }
}
