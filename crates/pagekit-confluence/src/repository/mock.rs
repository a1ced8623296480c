//! Mock page repository for testing.
//!
//! Provides [`MockRepository`] for exercising the update workflow without a
//! Confluence server.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::PageRepository;
use crate::error::ConfluenceError;
use crate::types::{Body, Page, Space, Version};
use crate::updater::UpdatePayload;

/// Failure a [`MockRepository`] can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// 404 from the server.
    NotFound,
    /// 409 from the server.
    VersionConflict,
    /// Connection reset before a response arrived.
    Network,
    /// 500 whose body mentions a version conflict.
    ServerError,
}

impl MockFailure {
    fn to_error(self) -> ConfluenceError {
        match self {
            Self::NotFound => ConfluenceError::NotFound {
                body: "No content found with id".to_owned(),
            },
            Self::VersionConflict => ConfluenceError::VersionConflict {
                body: "Version must be incremented on update".to_owned(),
            },
            Self::Network => ConfluenceError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )),
            Self::ServerError => ConfluenceError::HttpResponse {
                status: 500,
                body: "internal error: version conflict in cache".to_owned(),
            },
        }
    }
}

/// Build a page snapshot for tests.
#[must_use]
pub fn fixture_page(id: &str, space_key: &str, title: &str, version: u32) -> Page {
    Page {
        id: id.to_owned(),
        content_type: "page".to_owned(),
        status: "current".to_owned(),
        title: title.to_owned(),
        space: Some(Space {
            id: None,
            key: space_key.to_owned(),
            name: space_key.to_owned(),
            space_type: None,
        }),
        version: Version {
            number: version,
            message: None,
        },
        body: Some(Body::storage(format!("<p>{title}</p>"))),
        links: None,
    }
}

/// In-memory stand-in for the remote content service.
///
/// Holds the authoritative copy of every page and enforces the version
/// check the real server performs: an update is applied only when the
/// payload's expected version equals the stored version, and each applied
/// update bumps the version by exactly one.
///
/// Failures can be injected for specific call numbers (1-based, counted per
/// operation) to script conflict and outage scenarios.
///
/// # Example
///
/// ```ignore
/// let repo = MockRepository::new()
///     .with_page(fixture_page("42", "OPS", "Runbook", 2))
///     .fail_submit(1, MockFailure::VersionConflict);
/// ```
#[derive(Debug, Default)]
pub struct MockRepository {
    pages: Mutex<HashMap<String, Page>>,
    fetch_failures: Mutex<HashMap<usize, MockFailure>>,
    submit_failures: Mutex<HashMap<usize, MockFailure>>,
    always_conflict: AtomicBool,
    fetch_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    title_lookups: AtomicUsize,
    submitted: Mutex<Vec<UpdatePayload>>,
}

impl MockRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, page: Page) -> Self {
        self.pages.lock().unwrap().insert(page.id.clone(), page);
        self
    }

    /// Make the `call`-th fetch fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn fail_fetch(self, call: usize, failure: MockFailure) -> Self {
        self.fetch_failures.lock().unwrap().insert(call, failure);
        self
    }

    /// Make the `call`-th submit fail.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn fail_submit(self, call: usize, failure: MockFailure) -> Self {
        self.submit_failures.lock().unwrap().insert(call, failure);
        self
    }

    /// Reject every submit with a version conflict, as if another writer
    /// always saved first.
    #[must_use]
    pub fn always_conflict(self) -> Self {
        self.always_conflict.store(true, Ordering::SeqCst);
        self
    }

    /// Simulate another writer saving a page: bumps its version.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn concurrent_edit(&self, page_id: &str) {
        if let Some(page) = self.pages.lock().unwrap().get_mut(page_id) {
            page.version.number += 1;
        }
    }

    /// Current stored copy of a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page(&self, page_id: &str) -> Option<Page> {
        self.pages.lock().unwrap().get(page_id).cloned()
    }

    /// Number of `fetch_page` calls so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Number of `submit_update` calls so far.
    #[must_use]
    pub fn submit_count(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Number of `find_page_by_title` calls so far.
    #[must_use]
    pub fn title_lookup_count(&self) -> usize {
        self.title_lookups.load(Ordering::SeqCst)
    }

    /// Every payload passed to `submit_update`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn submitted(&self) -> Vec<UpdatePayload> {
        self.submitted.lock().unwrap().clone()
    }

    fn injected(failures: &Mutex<HashMap<usize, MockFailure>>, call: usize) -> Option<MockFailure> {
        failures.lock().unwrap().remove(&call)
    }

    fn apply(&self, page_id: &str, payload: &UpdatePayload) -> Result<Page, ConfluenceError> {
        let mut pages = self.pages.lock().unwrap();
        let Some(page) = pages.get_mut(page_id) else {
            return Err(MockFailure::NotFound.to_error());
        };

        if page.version.number != payload.expected_version {
            return Err(MockFailure::VersionConflict.to_error());
        }

        page.title.clone_from(&payload.title);
        page.status.clone_from(&payload.status);
        page.body = Some(Body::storage(payload.content.clone()));
        page.version = Version {
            number: page.version.number + 1,
            message: payload.version_message.clone(),
        };
        Ok(page.clone())
    }
}

impl PageRepository for MockRepository {
    async fn fetch_page(&self, page_id: &str) -> Result<Page, ConfluenceError> {
        let call = self.fetch_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(failure) = Self::injected(&self.fetch_failures, call) {
            return Err(failure.to_error());
        }

        self.page(page_id)
            .ok_or_else(|| MockFailure::NotFound.to_error())
    }

    async fn submit_update(
        &self,
        page_id: &str,
        payload: &UpdatePayload,
    ) -> Result<Page, ConfluenceError> {
        let call = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.submitted.lock().unwrap().push(payload.clone());

        if self.always_conflict.load(Ordering::SeqCst) {
            return Err(MockFailure::VersionConflict.to_error());
        }
        if let Some(failure) = Self::injected(&self.submit_failures, call) {
            return Err(failure.to_error());
        }

        self.apply(page_id, payload)
    }

    async fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        self.title_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .pages
            .lock()
            .unwrap()
            .values()
            .find(|p| p.title == title && p.space_key() == Some(space_key))
            .cloned())
    }
}
