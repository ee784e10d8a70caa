use super::{TransportError, UpstreamRequest, UpstreamResponse, UpstreamTransport};
use crate::platform::HttpMethod;
use crate::settings::UpstreamSettings;
use async_trait::async_trait;
use reqwest::{redirect, Client, Method};
use std::time::Duration;

/// Production transport backed by a shared `reqwest::Client`
///
/// Redirects are never followed: the platform answers with 302s for
/// signed-out sessions and those must be seen, not chased.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with an explicit per-request deadline
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_settings(settings: &UpstreamSettings) -> Result<Self, TransportError> {
        Self::new(settings.request_timeout())
    }
}

const fn convert_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
    }
}

fn map_send_error(err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[async_trait]
impl UpstreamTransport for ReqwestTransport {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, TransportError> {
        let mut builder = self
            .client
            .request(convert_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| map_send_error(&e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(e.to_string())
            } else {
                TransportError::Body(e.to_string())
            }
        })?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn request(method: HttpMethod, url: String) -> UpstreamRequest {
        UpstreamRequest {
            method,
            url,
            headers: vec![
                ("Cookie".to_string(), ".ROBLOSECURITY=abc".to_string()),
                ("x-csrf-token".to_string(), "tok".to_string()),
            ],
            body: None,
        }
    }

    #[tokio::test]
    async fn test_send_attaches_headers_and_reads_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/users/authenticated")
            .match_header("cookie", Matcher::Exact(".ROBLOSECURITY=abc".into()))
            .match_header("x-csrf-token", Matcher::Exact("tok".into()))
            .with_status(200)
            .with_header("x-csrf-token", "next")
            .with_body(r#"{"id":1}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let response = transport
            .send(request(
                HttpMethod::Get,
                format!("{}/v1/users/authenticated", server.url()),
            ))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.header("X-CSRF-Token"), Some("next"));
        assert_eq!(response.body, r#"{"id":1}"#);
    }

    #[tokio::test]
    async fn test_send_posts_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/presence")
            .match_body(Matcher::Exact(r#"{"location":"Home"}"#.into()))
            .with_status(204)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let mut req = request(HttpMethod::Post, format!("{}/presence", server.url()));
        req.body = Some(r#"{"location":"Home"}"#.to_string());

        let response = transport.send(req).await.unwrap();
        mock.assert_async().await;
        assert_eq!(response.status, 204);
    }

    #[tokio::test]
    async fn test_redirects_are_not_followed() {
        let mut server = Server::new_async().await;
        let redirect = server
            .mock("GET", "/my/settings/json")
            .with_status(302)
            .with_header("location", "/login")
            .create_async()
            .await;
        let login = server
            .mock("GET", "/login")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let response = transport
            .send(request(
                HttpMethod::Get,
                format!("{}/my/settings/json", server.url()),
            ))
            .await
            .unwrap();

        redirect.assert_async().await;
        login.assert_async().await;
        assert_eq!(response.status, 302);
        assert_eq!(response.header("location"), Some("/login"));
    }

    #[tokio::test]
    async fn test_unresponsive_upstream_times_out() {
        // Accepted by the kernel backlog but never answered.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let transport = ReqwestTransport::new(Duration::from_millis(200)).unwrap();
        let result = transport
            .send(request(HttpMethod::Get, format!("http://{addr}/stall")))
            .await;

        assert!(matches!(result, Err(TransportError::Timeout(_))));
        drop(listener);
    }

    #[tokio::test]
    async fn test_connection_refused_is_request_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        let result = transport
            .send(request(HttpMethod::Get, format!("http://{addr}/")))
            .await;

        assert!(matches!(result, Err(TransportError::Request(_))));
    }
}
