//! Page updater with optimistic concurrency.
//!
//! Confluence rejects a write whose version number is not exactly one above
//! the stored version. [`PageUpdater`] turns that rejection into a bounded
//! retry loop:
//!
//! 1. Fetch the current page
//! 2. Reject a rename onto a title used by another page in the space
//! 3. Submit the update based on the caller's expected version
//! 4. On a version conflict, wait, re-fetch and resubmit on the fresh version
//! 5. Report the changes and the version transition
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use pagekit_confluence::updater::{PageUpdater, RetryConfig, UpdateRequest};
//! use pagekit_confluence::{ConfluenceClient, Credentials};
//!
//! let client = ConfluenceClient::new(
//!     "https://confluence.example.com",
//!     &Credentials::Bearer("token".to_owned()),
//! );
//! let updater = PageUpdater::new(&client, RetryConfig::default());
//!
//! let request = UpdateRequest::new("123", 7)?
//!     .with_content("<p>Updated</p>")
//!     .with_version_message("Fix typo");
//!
//! // Preview without writing
//! let preview = updater.dry_run(&request).await?;
//!
//! // Perform update
//! let outcome = updater.update(&request).await?;
//! # Ok(())
//! # }
//! ```

mod changes;
mod conflict;
mod error;
mod executor;
mod request;
mod result;
mod retry;
mod workflow;

pub use changes::track_changes;
pub use conflict::is_version_conflict;
pub use error::UpdateError;
pub use executor::{AttemptOutcome, UpdateExecutor};
pub use request::{UpdatePayload, UpdateRequest};
pub use result::{DryRunResult, UpdateOutcome};
pub use retry::{AppliedUpdate, RetryConfig, RetryController};
pub use workflow::PageUpdater;
