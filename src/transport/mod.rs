//! Upstream HTTP transport
//!
//! The session core never talks to `reqwest` directly. It sends
//! [`UpstreamRequest`]s through an [`UpstreamTransport`], which lets tests
//! drive every decision path with a scripted fake.

pub mod reqwest_client;

pub use reqwest_client::ReqwestTransport;

use crate::platform::HttpMethod;
use async_trait::async_trait;
use thiserror::Error;

/// Transport-level failures. Callers treat all of them as "this endpoint
/// told us nothing" and move on.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Fully prepared outbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl UpstreamRequest {
    /// Value of the first header matching `name`, case-insensitively
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Buffered upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl UpstreamResponse {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// Value of the first header matching `name`, case-insensitively
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Every value of a repeated header such as `Set-Cookie`
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Sends a request upstream and returns the buffered response
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent, times out, or the
    /// response body cannot be read.
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = UpstreamResponse::new(403).with_header("X-CSRF-TOKEN", "abc");
        assert_eq!(response.header("x-csrf-token"), Some("abc"));
        assert_eq!(response.header("x-other"), None);
    }

    #[test]
    fn test_header_values_returns_all_repeats() {
        let response = UpstreamResponse::new(200)
            .with_header("set-cookie", "a=1")
            .with_header("Set-Cookie", "b=2");
        let values: Vec<_> = response.header_values("set-cookie").collect();
        assert_eq!(values, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_success_range() {
        assert!(UpstreamResponse::new(204).is_success());
        assert!(!UpstreamResponse::new(302).is_success());
        assert!(!UpstreamResponse::new(199).is_success());
    }
}
