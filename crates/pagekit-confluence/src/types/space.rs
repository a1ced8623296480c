//! Confluence space types.

use serde::{Deserialize, Serialize};

/// Confluence space.
///
/// Also used for the `space` object embedded in expanded content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Space {
    /// Numeric space ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Space key (e.g. "DOC", "~jsmith").
    pub key: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Space type ("global" or "personal").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub space_type: Option<String>,
}

/// Spaces API response.
#[derive(Debug, Clone, Deserialize)]
pub struct SpacesResponse {
    /// Spaces on this page of results.
    pub results: Vec<Space>,
    /// Offset of the first result.
    #[serde(default)]
    pub start: usize,
    /// Requested page size.
    #[serde(default)]
    pub limit: usize,
    /// Number of results returned.
    #[serde(default)]
    pub size: usize,
}
