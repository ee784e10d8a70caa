// Centralized logging utilities so every upstream attempt is reported the same way
use crate::platform::Endpoint;
use crate::transport::TransportError;
use log::{debug, info, warn};

/// Session identifiers are credentials; only their tail is ever logged.
#[must_use]
pub fn mask_session_id(session_id: &str) -> String {
    let chars: Vec<char> = session_id.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(6)..].iter().collect();
    format!("***{tail}")
}

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log that an endpoint is about to be called
    pub fn log_endpoint_attempt(purpose: &str, endpoint: &Endpoint, session_id: &str) {
        debug!(
            "🔄 {purpose}: calling {endpoint} for session {}",
            mask_session_id(session_id)
        );
    }

    /// Log a successful anti-forgery token acquisition
    pub fn log_token_acquired(endpoint: &Endpoint, session_id: &str) {
        info!(
            "✅ Anti-forgery token acquired from {} for session {}",
            endpoint.description,
            mask_session_id(session_id)
        );
    }

    /// Log an endpoint that answered but could not be used
    pub fn log_endpoint_skipped(endpoint: &Endpoint, status: u16, reason: &str) {
        debug!("⏭️  {endpoint} returned {status}: {reason}");
    }

    /// Log a network-level failure; the caller moves on to the next endpoint
    pub fn log_transport_failure(endpoint: &Endpoint, err: &TransportError) {
        warn!("❌ {endpoint} failed: {err}");
    }

    /// Log the single token-renewal retry after an anti-forgery rejection
    pub fn log_token_retry(purpose: &str, endpoint: &Endpoint, session_id: &str) {
        info!(
            "🔁 {purpose}: anti-forgery token rejected by {}, refetching for session {}",
            endpoint.description,
            mask_session_id(session_id)
        );
    }
}
