//! Error types for page update operations.

use crate::error::ConfluenceError;

/// Error during page update operation.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// The page does not exist (or was deleted while the update was retried).
    #[error("page {page_id} not found")]
    NotFound {
        /// Page that could not be found.
        page_id: String,
    },

    /// Business rule violation, e.g. renaming onto another page's title.
    #[error("{0}")]
    Validation(String),

    /// Every attempt hit a version conflict.
    #[error("page {page_id} update failed after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        /// Page being updated.
        page_id: String,
        /// Number of submit attempts made.
        attempts: u32,
        /// Conflict reported by the last attempt.
        source: ConfluenceError,
    },

    /// Any other failure from the remote, with the page it concerned.
    #[error("page {page_id}: {source}")]
    Repository {
        /// Page being updated.
        page_id: String,
        /// Underlying client error.
        source: ConfluenceError,
    },
}

impl UpdateError {
    /// Wrap a client error, keeping 404s as [`UpdateError::NotFound`].
    pub(crate) fn from_fetch(page_id: &str, source: ConfluenceError) -> Self {
        match source {
            ConfluenceError::NotFound { .. } => Self::NotFound {
                page_id: page_id.to_owned(),
            },
            source => Self::Repository {
                page_id: page_id.to_owned(),
                source,
            },
        }
    }
}
