//! Update request and wire payload.

use serde_json::json;

use super::error::UpdateError;
use crate::types::Page;

/// Caller's request to update a page.
///
/// `expected_version` is the version the caller believes is current; it is
/// always at least 1. Fields left unset keep the page's current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    page_id: String,
    expected_version: u32,
    title: Option<String>,
    content: Option<String>,
    status: Option<String>,
    version_message: Option<String>,
}

impl UpdateRequest {
    /// Start a request for `page_id` based on `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::Validation`] if `expected_version` is 0 or the
    /// page ID is empty.
    pub fn new(page_id: impl Into<String>, expected_version: u32) -> Result<Self, UpdateError> {
        let page_id = page_id.into();
        if page_id.is_empty() {
            return Err(UpdateError::Validation("page id cannot be empty".to_owned()));
        }
        if expected_version == 0 {
            return Err(UpdateError::Validation(
                "expected version must be at least 1".to_owned(),
            ));
        }
        Ok(Self {
            page_id,
            expected_version,
            title: None,
            content: None,
            status: None,
            version_message: None,
        })
    }

    /// Set a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set new storage-format content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set a new status ("current", "draft", ...).
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Attach a version message.
    #[must_use]
    pub fn with_version_message(mut self, message: impl Into<String>) -> Self {
        self.version_message = Some(message.into());
        self
    }

    /// Target page ID.
    #[must_use]
    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    /// Version the caller believes is current.
    #[must_use]
    pub fn expected_version(&self) -> u32 {
        self.expected_version
    }

    /// Requested title, if any.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Requested content, if any.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Requested status, if any.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Version message, if any.
    #[must_use]
    pub fn version_message(&self) -> Option<&str> {
        self.version_message.as_deref()
    }
}

/// Fully resolved update sent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePayload {
    /// Content type of the page being replaced.
    pub content_type: String,
    /// Title to store.
    pub title: String,
    /// Storage-format body to store.
    pub content: String,
    /// Status to store.
    pub status: String,
    /// Version message.
    pub version_message: Option<String>,
    /// Version this write is based on. The server stores
    /// `expected_version + 1` or rejects the write.
    pub expected_version: u32,
}

impl UpdatePayload {
    /// Overlay the request's fields onto `snapshot`, based on
    /// `expected_version`.
    #[must_use]
    pub fn rebase(request: &UpdateRequest, snapshot: &Page, expected_version: u32) -> Self {
        Self {
            content_type: snapshot.content_type.clone(),
            title: request.title().unwrap_or(snapshot.title.as_str()).to_owned(),
            content: request.content().unwrap_or(snapshot.content()).to_owned(),
            status: request.status().unwrap_or(snapshot.status.as_str()).to_owned(),
            version_message: request.version_message.clone(),
            expected_version,
        }
    }

    /// Version number the server assigns if this write is accepted.
    #[must_use]
    pub fn next_version(&self) -> u32 {
        self.expected_version.saturating_add(1)
    }

    /// JSON body for `PUT /content/{id}`.
    pub(crate) fn to_json(&self) -> serde_json::Value {
        let mut payload = json!({
            "type": self.content_type,
            "title": self.title,
            "status": self.status,
            "body": {
                "storage": {
                    "value": self.content,
                    "representation": "storage"
                }
            },
            "version": {"number": self.next_version()}
        });

        if let Some(msg) = &self.version_message {
            payload["version"]["message"] = json!(msg);
        }

        payload
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::repository::fixture_page;

    #[test]
    fn test_new_rejects_version_zero() {
        let err = UpdateRequest::new("42", 0).unwrap_err();
        assert!(matches!(err, UpdateError::Validation(_)));
    }

    #[test]
    fn test_new_rejects_empty_id() {
        assert!(UpdateRequest::new("", 1).is_err());
    }

    #[test]
    fn test_rebase_keeps_unset_fields_from_snapshot() {
        let snapshot = fixture_page("42", "OPS", "Runbook", 4);
        let request = UpdateRequest::new("42", 3)
            .unwrap()
            .with_title("Runbook v2");

        let payload = UpdatePayload::rebase(&request, &snapshot, 4);

        assert_eq!(payload.title, "Runbook v2");
        assert_eq!(payload.content, "<p>Runbook</p>");
        assert_eq!(payload.status, "current");
        assert_eq!(payload.expected_version, 4);
        assert_eq!(payload.next_version(), 5);
    }

    #[test]
    fn test_to_json_shape() {
        let snapshot = fixture_page("42", "OPS", "Runbook", 1);
        let request = UpdateRequest::new("42", 1)
            .unwrap()
            .with_content("<p>new</p>")
            .with_version_message("edited");

        let json = UpdatePayload::rebase(&request, &snapshot, 1).to_json();

        assert_eq!(
            json,
            json!({
                "type": "page",
                "title": "Runbook",
                "status": "current",
                "body": {"storage": {"value": "<p>new</p>", "representation": "storage"}},
                "version": {"number": 2, "message": "edited"}
            })
        );
    }
}
