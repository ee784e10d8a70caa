//! Candidate upstream endpoints
//!
//! Acquisition and refresh both walk an ordered list of endpoints. Order is
//! priority: earlier entries are always attempted first.

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP method used against an upstream endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single upstream endpoint the service may call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub description: String,
}

impl Endpoint {
    #[must_use]
    pub fn get(url: &str, description: &str) -> Self {
        Self {
            url: url.to_string(),
            method: HttpMethod::Get,
            body: None,
            description: description.to_string(),
        }
    }

    #[must_use]
    pub fn post(url: &str, description: &str) -> Self {
        Self {
            url: url.to_string(),
            method: HttpMethod::Post,
            body: None,
            description: description.to_string(),
        }
    }

    /// Attach a JSON body to the request sent to this endpoint
    #[must_use]
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.method, self.url, self.description)
    }
}

/// The "who am I" endpoint used to validate a session
#[must_use]
pub fn default_identity_endpoint() -> Endpoint {
    Endpoint::get(
        "https://users.roblox.com/v1/users/authenticated",
        "authenticated user",
    )
}

/// Endpoints known to hand out an anti-forgery token, in probing order
#[must_use]
pub fn default_acquisition_endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::post(
            "https://auth.roblox.com/v1/authentication-ticket",
            "authentication ticket",
        ),
        Endpoint::post(
            "https://catalog.roblox.com/v1/catalog/items/details",
            "catalog details",
        ),
        Endpoint::get("https://www.roblox.com/home", "home page"),
    ]
}

/// Endpoints whose success extends the session lifetime, in probing order
#[must_use]
pub fn default_refresh_endpoints() -> Vec<Endpoint> {
    vec![
        Endpoint::post(
            "https://auth.roblox.com/v1/authentication-ticket",
            "authentication ticket",
        ),
        Endpoint::post(
            "https://presence.roblox.com/v1/presence/register-app-presence",
            "presence heartbeat",
        )
        .with_body(r#"{"location":"Home"}"#),
        Endpoint::get("https://www.roblox.com/my/settings/json", "account settings"),
    ]
}
