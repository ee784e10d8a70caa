//! Results returned by session validation and refresh
//!
//! Neither operation ever returns an `Err`: every failure is folded into an
//! outcome record with a boolean flag and an optional error string, ready to
//! be serialised straight back to the caller.

use serde::{Deserialize, Serialize};

pub const ERR_MISSING_COOKIE: &str = "missing cookie";
pub const ERR_NO_TOKEN: &str = "no token";
pub const ERR_SESSION_INVALID: &str = "session invalid/expired";
pub const ERR_TOKEN_RETRY_FAILED: &str = "could not obtain valid token";
pub const ERR_FORBIDDEN: &str = "forbidden, insufficient permission";
pub const ERR_AUTHENTICATION: &str = "authentication errors";
pub const WARN_UNCONFIRMED: &str = "unconfirmed";

/// Identity payload of the platform's "who am I" endpoint; any field may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthenticatedUser {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationOutcome {
    #[must_use]
    pub fn authenticated(user: AuthenticatedUser) -> Self {
        Self {
            valid: true,
            user_id: user.id,
            username: user.name,
            display_name: user.display_name,
            error: None,
        }
    }

    /// Session accepted upstream but the identity body could not be read
    #[must_use]
    pub fn authenticated_anonymous() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn unexpected_status(status: u16) -> Self {
        Self::invalid(format!("unexpected status {status}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshOutcome {
    pub refreshed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RefreshOutcome {
    #[must_use]
    pub fn refreshed(cookie: impl Into<String>) -> Self {
        Self {
            refreshed: true,
            cookie: Some(cookie.into()),
            ..Self::default()
        }
    }

    /// No endpoint confirmed the refresh, but none proved the session dead either
    #[must_use]
    pub fn unconfirmed(cookie: impl Into<String>) -> Self {
        Self {
            refreshed: true,
            cookie: Some(cookie.into()),
            warning: Some(WARN_UNCONFIRMED.to_string()),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            refreshed: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_outcome_json_shape() {
        let outcome = ValidationOutcome::authenticated(AuthenticatedUser {
            id: Some(42),
            name: Some("builder".to_string()),
            display_name: Some("Builder".to_string()),
        });

        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"valid": true, "userId": 42, "username": "builder", "displayName": "Builder"})
        );
    }

    #[test]
    fn test_invalid_outcome_omits_identity() {
        let outcome = ValidationOutcome::invalid(ERR_SESSION_INVALID);
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"valid": false, "error": "session invalid/expired"})
        );
    }

    #[test]
    fn test_unexpected_status_message() {
        assert_eq!(
            ValidationOutcome::unexpected_status(429).error.as_deref(),
            Some("unexpected status 429")
        );
    }

    #[test]
    fn test_refresh_outcome_json_shape() {
        assert_eq!(
            serde_json::to_value(RefreshOutcome::unconfirmed("S1")).unwrap(),
            json!({"refreshed": true, "cookie": "S1", "warning": "unconfirmed"})
        );
        assert_eq!(
            serde_json::to_value(RefreshOutcome::failed(ERR_AUTHENTICATION)).unwrap(),
            json!({"refreshed": false, "error": "authentication errors"})
        );
    }

    #[test]
    fn test_authenticated_user_parses_platform_payload() {
        let user: AuthenticatedUser =
            serde_json::from_str(r#"{"id":1,"name":"a","displayName":"A","extra":true}"#).unwrap();
        assert_eq!(user.id, Some(1));
        assert_eq!(user.display_name.as_deref(), Some("A"));

        let partial: AuthenticatedUser = serde_json::from_str(r#"{"name":"a"}"#).unwrap();
        assert_eq!(partial.id, None);
        assert_eq!(partial.name.as_deref(), Some("a"));
    }
}
