//! Confluence REST API client.
//!
//! Provides a sync HTTP client for the Confluence Server/Data Center REST
//! API. Requests are authenticated with a personal access token (bearer) or
//! username + API token (basic).

mod pages;
mod search;
mod spaces;

pub use pages::NewPage;
pub(crate) use pages::PAGE_EXPAND;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use ureq::Agent;

use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Characters escaped in query-string and path components.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Credentials sent with every request.
#[derive(Clone)]
pub enum Credentials {
    /// `Authorization: Bearer <token>` (personal access token).
    Bearer(String),
    /// `Authorization: Basic base64(username:token)`.
    Basic {
        /// Account username or email.
        username: String,
        /// API token or password.
        token: String,
    },
}

impl Credentials {
    /// Pick basic auth when a username is configured, bearer otherwise.
    #[must_use]
    pub fn from_parts(username: Option<&str>, token: &str) -> Self {
        match username {
            Some(username) => Self::Basic {
                username: username.to_owned(),
                token: token.to_owned(),
            },
            None => Self::Bearer(token.to_owned()),
        }
    }

    fn header_value(&self) -> String {
        match self {
            Self::Bearer(token) => format!("Bearer {token}"),
            Self::Basic { username, token } => {
                format!("Basic {}", STANDARD.encode(format!("{username}:{token}")))
            }
        }
    }
}

/// Confluence REST API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth_header: String,
}

impl ConfluenceClient {
    /// Create a client for `base_url` with the default timeout.
    #[must_use]
    pub fn new(base_url: &str, credentials: &Credentials) -> Self {
        Self::with_timeout(
            base_url,
            credentials,
            Duration::from_secs(DEFAULT_TIMEOUT),
        )
    }

    /// Create a client with an explicit global request timeout.
    #[must_use]
    pub fn with_timeout(base_url: &str, credentials: &Credentials, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth_header: credentials.header_value(),
        }
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }

    /// GET `url` and decode the JSON body.
    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ConfluenceError> {
        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        read_json(response)
    }

    /// POST or PUT a JSON payload to `url` and decode the JSON body.
    fn send_json<T: DeserializeOwned>(
        &self,
        method: SendMethod,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<T, ConfluenceError> {
        let payload_bytes = serde_json::to_vec(payload)?;

        let request = match method {
            SendMethod::Post => self.agent.post(url),
            SendMethod::Put => self.agent.put(url),
        };
        let response = request
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        read_json(response)
    }

    /// DELETE `url`, expecting an empty success response.
    fn delete(&self, url: &str) -> Result<(), ConfluenceError> {
        let response = self
            .agent
            .delete(url)
            .header("Authorization", &self.auth_header)
            .call()?;

        check_status(response).map(drop)
    }
}

/// Body-carrying HTTP methods.
#[derive(Debug, Clone, Copy)]
enum SendMethod {
    Post,
    Put,
}

/// Turn an error status into [`ConfluenceError`], passing success through.
fn check_status(
    response: ureq::http::Response<ureq::Body>,
) -> Result<ureq::Body, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::from_status(status, error_body));
    }

    Ok(body_reader)
}

fn read_json<T: DeserializeOwned>(
    response: ureq::http::Response<ureq::Body>,
) -> Result<T, ConfluenceError> {
    let mut body_reader = check_status(response)?;
    Ok(body_reader.read_json()?)
}

/// Percent-encode a single path segment or query value.
fn encode(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_bearer_header() {
        let creds = Credentials::from_parts(None, "pat-123");
        assert_eq!(creds.header_value(), "Bearer pat-123");
    }

    #[test]
    fn test_basic_header() {
        let creds = Credentials::from_parts(Some("alice"), "secret");
        // base64("alice:secret")
        assert_eq!(creds.header_value(), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ConfluenceClient::new(
            "https://wiki.example.com/",
            &Credentials::Bearer("t".to_owned()),
        );
        assert_eq!(client.api_url(), "https://wiki.example.com/rest/api");
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode("Release Notes & FAQ"), "Release%20Notes%20%26%20FAQ");
        assert_eq!(encode("~jsmith"), "~jsmith");
        assert_eq!(encode("a/b?c=d"), "a%2Fb%3Fc%3Dd");
    }
}
