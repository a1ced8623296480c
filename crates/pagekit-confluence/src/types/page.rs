//! Confluence page types.

use serde::{Deserialize, Serialize};

use super::Space;

/// Confluence page (or any other versioned content item).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Content type ("page", "blogpost", ...).
    #[serde(rename = "type")]
    pub content_type: String,
    /// Content status ("current", "draft", "trashed").
    #[serde(default = "default_status")]
    pub status: String,
    /// Page title.
    pub title: String,
    /// Containing space, when expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<Space>,
    /// Version information.
    pub version: Version,
    /// Page body content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    /// Hypermedia links.
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

impl Page {
    /// Storage-format body, or `""` when the body was not expanded.
    #[must_use]
    pub fn content(&self) -> &str {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map_or("", |s| s.value.as_str())
    }

    /// Key of the containing space, when expanded.
    #[must_use]
    pub fn space_key(&self) -> Option<&str> {
        self.space.as_ref().map(|s| s.key.as_str())
    }
}

fn default_status() -> String {
    "current".to_owned()
}

/// Page version.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// Version message/comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Body {
    /// Storage format content.
    #[serde(default)]
    pub storage: Option<Storage>,
}

impl Body {
    /// Body holding `value` in storage representation.
    #[must_use]
    pub fn storage(value: impl Into<String>) -> Self {
        Self {
            storage: Some(Storage {
                value: value.into(),
                representation: "storage".to_owned(),
            }),
        }
    }
}

/// Storage format representation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Storage {
    /// HTML content in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Links {
    /// Web UI link.
    #[serde(default)]
    pub webui: Option<String>,
    /// API self link.
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
}
