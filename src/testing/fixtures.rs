//! Test fixtures providing pre-built test objects

use super::constants::TEST_BASE_URL;
use crate::platform::Endpoint;
use crate::settings::{EndpointSettings, KeeperSettings};
use crate::transport::{TransportError, UpstreamResponse};

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// `count` acquisition endpoints with distinct URLs, alternating POST and GET
    #[must_use]
    pub fn acquisition_endpoints(count: usize) -> Vec<Endpoint> {
        (1..=count)
            .map(|i| {
                let url = format!("{TEST_BASE_URL}/acquire/{i}");
                let description = format!("acquisition {i}");
                if i % 2 == 1 {
                    Endpoint::post(&url, &description)
                } else {
                    Endpoint::get(&url, &description)
                }
            })
            .collect()
    }

    /// `count` refresh endpoints; the second one carries a JSON body
    #[must_use]
    pub fn refresh_endpoints(count: usize) -> Vec<Endpoint> {
        (1..=count)
            .map(|i| {
                let url = format!("{TEST_BASE_URL}/refresh/{i}");
                let description = format!("refresh {i}");
                match i {
                    2 => Endpoint::post(&url, &description).with_body(r#"{"location":"Home"}"#),
                    _ if i % 2 == 1 => Endpoint::post(&url, &description),
                    _ => Endpoint::get(&url, &description),
                }
            })
            .collect()
    }

    #[must_use]
    pub fn identity_endpoint() -> Endpoint {
        Endpoint::get(&format!("{TEST_BASE_URL}/users/authenticated"), "identity")
    }

    /// Default settings pointed at the fixture endpoints
    #[must_use]
    pub fn settings() -> KeeperSettings {
        Self::settings_with(2, 3)
    }

    #[must_use]
    pub fn settings_with(acquisition: usize, refresh: usize) -> KeeperSettings {
        KeeperSettings {
            endpoints: EndpointSettings {
                identity: Self::identity_endpoint(),
                acquisition: Self::acquisition_endpoints(acquisition),
                refresh: Self::refresh_endpoints(refresh),
            },
            ..KeeperSettings::default()
        }
    }

    /// A 403 that hands out a token, as the platform does for token-less writes
    #[must_use]
    pub fn token_response(token: &str) -> UpstreamResponse {
        UpstreamResponse::new(403)
            .with_header("x-csrf-token", token)
            .with_body(r#"{"errors":[{"code":0,"message":"Token Validation Failed"}]}"#)
    }

    /// A 403 that rejects the token without handing out a new one
    #[must_use]
    pub fn csrf_rejection() -> UpstreamResponse {
        UpstreamResponse::new(403)
            .with_body(r#"{"errors":[{"code":0,"message":"Token Validation Failed"}]}"#)
    }

    #[must_use]
    pub fn identity_response(id: u64, name: &str, display_name: &str) -> UpstreamResponse {
        UpstreamResponse::new(200).with_body(
            &serde_json::json!({
                "id": id,
                "name": name,
                "displayName": display_name
            })
            .to_string(),
        )
    }

    #[must_use]
    pub fn connect_error() -> TransportError {
        TransportError::Request("connection refused".to_string())
    }

    #[must_use]
    pub fn timeout_error() -> TransportError {
        TransportError::Timeout("operation timed out".to_string())
    }
}
