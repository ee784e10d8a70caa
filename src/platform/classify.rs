//! Response classification
//!
//! The platform answers a missing or stale anti-forgery token with a 403,
//! but it also uses 403 for plain permission failures. These helpers tell
//! the two apart from the status, the token header and the body text.

use super::{CSRF_HEADER, SESSION_COOKIE_NAME};
use crate::transport::UpstreamResponse;

/// Body fragments that identify an anti-forgery rejection (lowercase)
const TOKEN_REJECTION_MARKERS: &[&str] = &["token validation failed", "xsrf", "csrf"];

/// Coarse outcome of an upstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// Any 2xx
    Success,
    /// 401: the session itself is gone
    SessionRejected,
    /// 403 naming the anti-forgery mechanism
    TokenRejected,
    /// 403 for any other reason
    Forbidden,
    /// Everything else, redirects included
    Unexpected(u16),
}

/// The anti-forgery token handed out by this response, if any
#[must_use]
pub fn extract_token(response: &UpstreamResponse) -> Option<String> {
    response
        .header(CSRF_HEADER)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
}

#[must_use]
pub fn is_token_rejection(response: &UpstreamResponse) -> bool {
    if response.status != 403 {
        return false;
    }
    if response.header(CSRF_HEADER).is_some() {
        return true;
    }
    let body = response.body.to_ascii_lowercase();
    TOKEN_REJECTION_MARKERS
        .iter()
        .any(|marker| body.contains(marker))
}

#[must_use]
pub fn classify(response: &UpstreamResponse) -> ResponseClass {
    match response.status {
        200..=299 => ResponseClass::Success,
        401 => ResponseClass::SessionRejected,
        403 if is_token_rejection(response) => ResponseClass::TokenRejected,
        403 => ResponseClass::Forbidden,
        other => ResponseClass::Unexpected(other),
    }
}

/// Refresh only trusts these three codes as proof the session was extended
#[must_use]
pub const fn is_refresh_success(status: u16) -> bool {
    matches!(status, 200 | 201 | 204)
}

/// New session value if the response rotated the session cookie
#[must_use]
pub fn rotated_session(response: &UpstreamResponse) -> Option<String> {
    response.header_values("set-cookie").find_map(|cookie| {
        let pair = cookie.split(';').next()?.trim();
        let (name, value) = pair.split_once('=')?;
        let value = value.trim();
        (name.trim() == SESSION_COOKIE_NAME && !value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token_ignores_blank() {
        let response = UpstreamResponse::new(403).with_header("x-csrf-token", "  ");
        assert_eq!(extract_token(&response), None);

        let response = UpstreamResponse::new(403).with_header("X-CSRF-TOKEN", "T1");
        assert_eq!(extract_token(&response), Some("T1".to_string()));
    }

    #[test]
    fn test_token_rejection_from_body() {
        let response = UpstreamResponse::new(403)
            .with_body(r#"{"errors":[{"code":0,"message":"Token Validation Failed"}]}"#);
        assert!(is_token_rejection(&response));
        assert_eq!(classify(&response), ResponseClass::TokenRejected);
    }

    #[test]
    fn test_token_rejection_from_header() {
        let response = UpstreamResponse::new(403).with_header("x-csrf-token", "fresh");
        assert_eq!(classify(&response), ResponseClass::TokenRejected);
    }

    #[test]
    fn test_plain_forbidden() {
        let response = UpstreamResponse::new(403).with_body(r#"{"message":"Forbidden"}"#);
        assert!(!is_token_rejection(&response));
        assert_eq!(classify(&response), ResponseClass::Forbidden);
    }

    #[test]
    fn test_marker_on_non_403_is_not_rejection() {
        let response = UpstreamResponse::new(400).with_body("csrf");
        assert!(!is_token_rejection(&response));
        assert_eq!(classify(&response), ResponseClass::Unexpected(400));
    }

    #[test]
    fn test_classify_status_table() {
        assert_eq!(
            classify(&UpstreamResponse::new(200)),
            ResponseClass::Success
        );
        assert_eq!(
            classify(&UpstreamResponse::new(202)),
            ResponseClass::Success
        );
        assert_eq!(
            classify(&UpstreamResponse::new(401)),
            ResponseClass::SessionRejected
        );
        assert_eq!(
            classify(&UpstreamResponse::new(302)),
            ResponseClass::Unexpected(302)
        );
    }

    #[test]
    fn test_refresh_success_codes() {
        assert!(is_refresh_success(200));
        assert!(is_refresh_success(201));
        assert!(is_refresh_success(204));
        assert!(!is_refresh_success(202));
        assert!(!is_refresh_success(302));
    }

    #[test]
    fn test_rotated_session_from_set_cookie() {
        let response = UpstreamResponse::new(200)
            .with_header("set-cookie", "RBXEventTrackerV2=x; path=/")
            .with_header(
                "Set-Cookie",
                ".ROBLOSECURITY=NEW; domain=.roblox.com; path=/; secure; HttpOnly",
            );
        assert_eq!(rotated_session(&response), Some("NEW".to_string()));
    }

    #[test]
    fn test_rotated_session_ignores_cleared_cookie() {
        let response =
            UpstreamResponse::new(200).with_header("set-cookie", ".ROBLOSECURITY=; expires=0");
        assert_eq!(rotated_session(&response), None);
    }
}
