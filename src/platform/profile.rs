use super::{Endpoint, CSRF_HEADER, SESSION_COOKIE_NAME};
use crate::settings::UpstreamSettings;
use crate::transport::UpstreamRequest;

/// Browser-identifying headers sent with every upstream request
///
/// The platform only accepts session traffic that looks browser-originated,
/// so these stay constant for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub origin: String,
    pub referer: String,
    pub accept: String,
    pub accept_language: String,
}

impl BrowserProfile {
    #[must_use]
    pub fn from_settings(settings: &UpstreamSettings) -> Self {
        Self {
            user_agent: settings.user_agent.clone(),
            origin: settings.origin.clone(),
            referer: settings.referer.clone(),
            accept: settings.accept.clone(),
            accept_language: settings.accept_language.clone(),
        }
    }

    /// Build the request for `endpoint` on behalf of `session_id`,
    /// attaching the anti-forgery token when one is known.
    #[must_use]
    pub fn build_request(
        &self,
        endpoint: &Endpoint,
        session_id: &str,
        token: Option<&str>,
    ) -> UpstreamRequest {
        let mut headers = vec![
            ("User-Agent".to_string(), self.user_agent.clone()),
            ("Origin".to_string(), self.origin.clone()),
            ("Referer".to_string(), self.referer.clone()),
            ("Accept".to_string(), self.accept.clone()),
            ("Accept-Language".to_string(), self.accept_language.clone()),
            (
                "Cookie".to_string(),
                format!("{SESSION_COOKIE_NAME}={session_id}"),
            ),
        ];

        if let Some(token) = token {
            headers.push((CSRF_HEADER.to_string(), token.to_string()));
        }

        if endpoint.body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        UpstreamRequest {
            method: endpoint.method,
            url: endpoint.url.clone(),
            headers,
            body: endpoint.body.clone(),
        }
    }
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self::from_settings(&UpstreamSettings::default())
    }
}
