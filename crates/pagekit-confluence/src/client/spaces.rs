//! Space operations for Confluence API.

use tracing::info;

use super::{ConfluenceClient, encode};
use crate::error::ConfluenceError;
use crate::types::{Space, SpacesResponse};

impl ConfluenceClient {
    /// Get a space by key.
    pub fn get_space(&self, space_key: &str) -> Result<Space, ConfluenceError> {
        let url = format!("{}/space/{}", self.api_url(), encode(space_key));
        info!("Getting space {}", space_key);
        self.get_json(&url)
    }

    /// List spaces visible to the authenticated user.
    pub fn list_spaces(&self, start: usize, limit: usize) -> Result<SpacesResponse, ConfluenceError> {
        let url = format!("{}/space?start={start}&limit={limit}", self.api_url());
        info!("Listing spaces (start={}, limit={})", start, limit);

        let spaces: SpacesResponse = self.get_json(&url)?;
        info!("Found {} spaces", spaces.size);
        Ok(spaces)
    }
}
