//! CQL search for Confluence API.

use tracing::info;

use super::{ConfluenceClient, encode};
use crate::error::ConfluenceError;
use crate::query::Query;
use crate::types::ContentList;

impl ConfluenceClient {
    /// Run a CQL query against `/content/search`.
    pub fn search(
        &self,
        query: &Query,
        start: usize,
        limit: usize,
    ) -> Result<ContentList, ConfluenceError> {
        if limit == 0 {
            return Err(ConfluenceError::InvalidRequest(
                "search limit must be greater than 0".to_owned(),
            ));
        }

        let cql = query.to_cql();
        let url = self.search_url(&cql, start, limit);
        info!("Searching: {}", cql);

        let results: ContentList = self.get_json(&url)?;
        info!(
            "Search returned {} of {} results",
            results.size,
            results.total_size.unwrap_or(results.size)
        );
        Ok(results)
    }

    fn search_url(&self, cql: &str, start: usize, limit: usize) -> String {
        format!(
            "{}/content/search?cql={}&start={start}&limit={limit}&expand=version,space",
            self.api_url(),
            encode(cql)
        )
    }
}
