//! Page operations for Confluence API.

use serde_json::json;
use tracing::info;

use super::{ConfluenceClient, SendMethod, encode};
use crate::error::ConfluenceError;
use crate::types::{ContentList, Page};
use crate::updater::UpdatePayload;

/// Expansions requested whenever a page is fetched for the update workflow.
pub(crate) const PAGE_EXPAND: &[&str] = &["body.storage", "version", "space"];

/// New page to create.
#[derive(Debug, Clone)]
pub struct NewPage<'a> {
    /// Key of the space to create the page in.
    pub space_key: &'a str,
    /// Page title (unique within the space).
    pub title: &'a str,
    /// Body in Confluence storage format.
    pub body: &'a str,
    /// Optional parent page ID.
    pub parent_id: Option<&'a str>,
}

impl ConfluenceClient {
    /// Get page by ID with optional field expansion.
    pub fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        let url = self.page_url(page_id, expand);
        info!("Getting page {}", page_id);
        self.get_json(&url)
    }

    /// Create a page.
    pub fn create_page(&self, page: &NewPage<'_>) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        let mut payload = json!({
            "type": "page",
            "title": page.title,
            "space": {"key": page.space_key},
            "body": {
                "storage": {
                    "value": page.body,
                    "representation": "storage"
                }
            }
        });

        if let Some(parent_id) = page.parent_id {
            payload["ancestors"] = json!([{"id": parent_id}]);
        }

        info!("Creating page '{}' in space {}", page.title, page.space_key);

        let created: Page = self.send_json(SendMethod::Post, &url, &payload)?;
        info!("Created page {} (version {})", created.id, created.version.number);
        Ok(created)
    }

    /// Submit one update attempt.
    ///
    /// The server accepts the write only if `payload.expected_version` is
    /// still its current version; otherwise it answers 409, surfaced as
    /// [`ConfluenceError::VersionConflict`].
    pub fn update_page(
        &self,
        page_id: &str,
        payload: &UpdatePayload,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), encode(page_id));

        info!(
            "Updating page {} from version {} to {}",
            page_id,
            payload.expected_version,
            payload.next_version()
        );

        let page: Page = self.send_json(SendMethod::Put, &url, &payload.to_json())?;
        info!("Updated page {} to version {}", page_id, page.version.number);
        Ok(page)
    }

    /// Move a page to the trash.
    pub fn delete_page(&self, page_id: &str) -> Result<(), ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), encode(page_id));
        info!("Deleting page {}", page_id);
        self.delete(&url)
    }

    /// Find a page by exact title within a space.
    pub fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        let url = format!(
            "{}/content?type=page&spaceKey={}&title={}&expand=version,space",
            self.api_url(),
            encode(space_key),
            encode(title)
        );

        info!("Looking up page '{}' in space {}", title, space_key);

        let list: ContentList = self.get_json(&url)?;
        Ok(list.results.into_iter().next())
    }

    /// Get web URL for page.
    pub fn get_page_url(&self, page_id: &str) -> Result<String, ConfluenceError> {
        let page = self.get_page(page_id, &[])?;
        Ok(self.web_url(&page))
    }

    /// Web URL of an already-fetched page.
    #[must_use]
    pub fn web_url(&self, page: &Page) -> String {
        if let Some(links) = &page.links
            && let Some(webui) = &links.webui
        {
            return format!("{}{}", self.base_url, webui);
        }

        format!(
            "{}/pages/viewpage.action?pageId={}",
            self.base_url,
            encode(&page.id)
        )
    }

    fn page_url(&self, page_id: &str, expand: &[&str]) -> String {
        let mut url = format!("{}/content/{}", self.api_url(), encode(page_id));
        if !expand.is_empty() {
            url.push_str("?expand=");
            url.push_str(&expand.join(","));
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::client::Credentials;
    use crate::types::{Links, Version};

    fn client() -> ConfluenceClient {
        ConfluenceClient::new(
            "https://wiki.example.com",
            &Credentials::Bearer("t".to_owned()),
        )
    }

    /// Answer one HTTP request with `status` and a JSON `body`; the handle
    /// yields the request line.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 8192];
            let n = stream.read(&mut buf).unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).into_owned();
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            request.lines().next().unwrap_or_default().to_owned()
        });
        (base_url, handle)
    }

    fn page(links: Option<Links>) -> Page {
        Page {
            id: "42".to_owned(),
            content_type: "page".to_owned(),
            status: "current".to_owned(),
            title: "Runbook".to_owned(),
            space: None,
            version: Version {
                number: 1,
                message: None,
            },
            body: None,
            links,
        }
    }

    #[test]
    fn test_page_url_with_expand() {
        assert_eq!(
            client().page_url("42", PAGE_EXPAND),
            "https://wiki.example.com/rest/api/content/42?expand=body.storage,version,space"
        );
    }

    #[test]
    fn test_page_url_without_expand() {
        assert_eq!(
            client().page_url("42", &[]),
            "https://wiki.example.com/rest/api/content/42"
        );
    }

    #[test]
    fn test_page_id_is_encoded_in_path() {
        assert_eq!(
            client().page_url("42/../1", &[]),
            "https://wiki.example.com/rest/api/content/42%2F..%2F1"
        );
    }

    #[test]
    fn test_web_url_prefers_webui_link() {
        let page = page(Some(Links {
            webui: Some("/display/OPS/Runbook".to_owned()),
            self_link: None,
        }));
        assert_eq!(
            client().web_url(&page),
            "https://wiki.example.com/display/OPS/Runbook"
        );
    }

    #[test]
    fn test_web_url_falls_back_to_viewpage() {
        assert_eq!(
            client().web_url(&page(None)),
            "https://wiki.example.com/pages/viewpage.action?pageId=42"
        );
    }

    #[test]
    fn test_get_page_url_uses_webui_link_from_server() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"id":"42","type":"page","title":"Runbook","version":{"number":3},"_links":{"webui":"/display/OPS/Runbook"}}"#,
        );
        let client = ConfluenceClient::new(&base_url, &Credentials::Bearer("t".to_owned()));

        let url = client.get_page_url("42").unwrap();

        assert_eq!(url, format!("{base_url}/display/OPS/Runbook"));
        assert_eq!(
            server.join().unwrap(),
            "GET /rest/api/content/42 HTTP/1.1"
        );
    }

    #[test]
    fn test_get_page_url_missing_page() {
        let (base_url, server) = serve_once("404 Not Found", r#"{"message":"No content found"}"#);
        let client = ConfluenceClient::new(&base_url, &Credentials::Bearer("t".to_owned()));

        let err = client.get_page_url("42").unwrap_err();

        assert!(matches!(err, ConfluenceError::NotFound { .. }));
        server.join().unwrap();
    }
}
