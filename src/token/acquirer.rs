use super::TokenCache;
use crate::platform::{extract_token, is_token_rejection, BrowserProfile, Endpoint};
use crate::transport::UpstreamTransport;
use crate::utils::logging::{mask_session_id, LoggingHelper};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AcquireError {
    #[error("no token obtainable after trying {attempted} endpoint(s)")]
    NoTokenObtainable { attempted: usize },
}

/// Probes the acquisition endpoints in order until one hands out an
/// anti-forgery token for the session
///
/// The platform leaks the token inconsistently across its surfaces, so the
/// list is walked front to back and the first token wins. Every token found
/// is written to the shared [`TokenCache`].
pub struct TokenAcquirer {
    transport: Arc<dyn UpstreamTransport>,
    cache: Arc<TokenCache>,
    profile: BrowserProfile,
    endpoints: Vec<Endpoint>,
}

impl TokenAcquirer {
    #[must_use]
    pub fn new(
        transport: Arc<dyn UpstreamTransport>,
        cache: Arc<TokenCache>,
        profile: BrowserProfile,
        endpoints: Vec<Endpoint>,
    ) -> Self {
        Self {
            transport,
            cache,
            profile,
            endpoints,
        }
    }

    /// Fetch a fresh token from upstream, bypassing the cache for the read
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::NoTokenObtainable`] when no endpoint returned
    /// the anti-forgery header.
    pub async fn acquire(&self, session_id: &str) -> Result<String, AcquireError> {
        for endpoint in &self.endpoints {
            LoggingHelper::log_endpoint_attempt("token acquisition", endpoint, session_id);

            let request = self.profile.build_request(endpoint, session_id, None);
            let response = match self.transport.send(request).await {
                Ok(response) => response,
                Err(err) => {
                    LoggingHelper::log_transport_failure(endpoint, &err);
                    continue;
                }
            };

            if let Some(token) = extract_token(&response) {
                self.cache.store(session_id, &token);
                LoggingHelper::log_token_acquired(endpoint, session_id);
                return Ok(token);
            }

            let reason = if is_token_rejection(&response) {
                "endpoint demands a token without handing one out"
            } else {
                "no anti-forgery header in response"
            };
            LoggingHelper::log_endpoint_skipped(endpoint, response.status, reason);
        }

        log::warn!(
            "No anti-forgery token obtainable for session {}",
            mask_session_id(session_id)
        );
        Err(AcquireError::NoTokenObtainable {
            attempted: self.endpoints.len(),
        })
    }

    /// Cached token if still fresh, otherwise a newly acquired one
    ///
    /// # Errors
    ///
    /// Returns an error if the cache misses and acquisition fails.
    pub async fn resolve(&self, session_id: &str) -> Result<String, AcquireError> {
        if let Some(token) = self.cache.lookup(session_id) {
            log::debug!(
                "Using cached anti-forgery token for session {}",
                mask_session_id(session_id)
            );
            return Ok(token);
        }
        self.acquire(session_id).await
    }

    #[must_use]
    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }
}
