//! Target platform knowledge
//!
//! Everything specific to the upstream platform lives here: cookie and
//! header names, the default endpoint lists, the browser profile attached to
//! every request, and the rules used to classify responses.

pub mod classify;
pub mod endpoint;
pub mod profile;

pub use classify::{
    classify, extract_token, is_refresh_success, is_token_rejection, rotated_session,
    ResponseClass,
};
pub use endpoint::{
    default_acquisition_endpoints, default_identity_endpoint, default_refresh_endpoints,
    Endpoint, HttpMethod,
};
pub use profile::BrowserProfile;

/// Name of the platform's session cookie
pub const SESSION_COOKIE_NAME: &str = ".ROBLOSECURITY";

/// Header carrying the anti-forgery token, both directions
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Strip whitespace and an optional `.ROBLOSECURITY=` prefix from a caller-supplied cookie
#[must_use]
pub fn normalize_session_id(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix(SESSION_COOKIE_NAME)
        .and_then(|rest| rest.strip_prefix('='))
        .map_or(trimmed, str::trim)
}
