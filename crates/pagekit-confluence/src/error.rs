//! Error types for Confluence API operations.

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// Server answered 404.
    #[error("not found: {body}")]
    NotFound {
        /// Response body (may contain error details).
        body: String,
    },

    /// Server answered 409: the submitted version is not the successor of
    /// the current one.
    #[error("version conflict: {body}")]
    VersionConflict {
        /// Response body (may contain error details).
        body: String,
    },

    /// HTTP response error (server returned any other error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Blocking request task panicked or was cancelled.
    #[error("request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Request rejected before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ConfluenceError {
    /// Map an error status and body to the matching variant.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => Self::NotFound { body },
            409 => Self::VersionConflict { body },
            _ => Self::HttpResponse { status, body },
        }
    }
}
