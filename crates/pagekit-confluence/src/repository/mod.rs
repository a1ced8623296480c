//! Page repository abstraction used by the update workflow.
//!
//! [`PageRepository`] is the boundary between the update workflow and the
//! remote system of record. [`ConfluenceClient`] implements it by running
//! its blocking HTTP calls on tokio's blocking pool; [`MockRepository`]
//! (behind the `mock` feature) simulates the server's version check in
//! memory.

#[cfg(any(test, feature = "mock"))]
mod mock;

use std::future::Future;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockFailure, MockRepository, fixture_page};

use crate::client::{ConfluenceClient, PAGE_EXPAND};
use crate::error::ConfluenceError;
use crate::types::Page;
use crate::updater::UpdatePayload;

/// Remote pages the update workflow reads and writes.
///
/// The remote owns the version counter: `submit_update` must reject a
/// payload whose `expected_version` is not current with
/// [`ConfluenceError::VersionConflict`].
pub trait PageRepository: Send + Sync {
    /// Fetch the current snapshot of a page (body, version and space).
    ///
    /// Returns [`ConfluenceError::NotFound`] if the page does not exist.
    fn fetch_page(&self, page_id: &str)
    -> impl Future<Output = Result<Page, ConfluenceError>> + Send;

    /// Submit one update attempt.
    fn submit_update(
        &self,
        page_id: &str,
        payload: &UpdatePayload,
    ) -> impl Future<Output = Result<Page, ConfluenceError>> + Send;

    /// Find a page by exact title within a space.
    fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> impl Future<Output = Result<Option<Page>, ConfluenceError>> + Send;
}

impl PageRepository for ConfluenceClient {
    async fn fetch_page(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        let client = self.clone();
        let page_id = page_id.to_owned();
        blocking(move || client.get_page(&page_id, PAGE_EXPAND)).await
    }

    async fn submit_update(
        &self,
        page_id: &str,
        payload: &UpdatePayload,
    ) -> Result<Page, ConfluenceError> {
        let client = self.clone();
        let page_id = page_id.to_owned();
        let payload = payload.clone();
        blocking(move || client.update_page(&page_id, &payload)).await
    }

    async fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        let client = self.clone();
        let space_key = space_key.to_owned();
        let title = title.to_owned();
        blocking(move || client.find_page_by_title(&space_key, &title)).await
    }
}

/// Run a blocking client call without stalling the async runtime.
async fn blocking<T, F>(call: F) -> Result<T, ConfluenceError>
where
    F: FnOnce() -> Result<T, ConfluenceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call).await?
}
