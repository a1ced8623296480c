//! Content listing and search responses.

use serde::Deserialize;

use super::Page;

/// List of content items returned by `/content` and `/content/search`.
///
/// Only the pagination fields the client reports are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentList {
    /// Content items on this page of results.
    pub results: Vec<Page>,
    /// Offset of the first result.
    #[serde(default)]
    pub start: usize,
    /// Requested page size.
    #[serde(default)]
    pub limit: usize,
    /// Number of results returned.
    #[serde(default)]
    pub size: usize,
    /// Total matches across all pages (search only).
    #[serde(rename = "totalSize", default)]
    pub total_size: Option<usize>,
}
