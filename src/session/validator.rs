use crate::models::outcome::{
    AuthenticatedUser, ValidationOutcome, ERR_FORBIDDEN, ERR_NO_TOKEN, ERR_SESSION_INVALID,
    ERR_TOKEN_RETRY_FAILED,
};
use crate::platform::{classify, BrowserProfile, Endpoint, ResponseClass};
use crate::token::TokenAcquirer;
use crate::transport::{TransportError, UpstreamResponse, UpstreamTransport};
use crate::utils::logging::{mask_session_id, LoggingHelper};
use std::sync::Arc;

/// Checks that a session is still authenticated by calling the platform's
/// "who am I" endpoint
///
/// An anti-forgery rejection triggers exactly one token refetch and retry.
/// A second rejection is reported, never retried again.
pub struct SessionValidator {
    transport: Arc<dyn UpstreamTransport>,
    acquirer: Arc<TokenAcquirer>,
    profile: BrowserProfile,
    identity: Endpoint,
}

impl SessionValidator {
    #[must_use]
    pub fn new(
        transport: Arc<dyn UpstreamTransport>,
        acquirer: Arc<TokenAcquirer>,
        profile: BrowserProfile,
        identity: Endpoint,
    ) -> Self {
        Self {
            transport,
            acquirer,
            profile,
            identity,
        }
    }

    pub async fn validate(&self, session_id: &str) -> ValidationOutcome {
        let Ok(token) = self.acquirer.resolve(session_id).await else {
            return ValidationOutcome::invalid(ERR_NO_TOKEN);
        };

        let response = match self.request_identity(session_id, &token).await {
            Ok(response) => response,
            Err(err) => return ValidationOutcome::invalid(err.to_string()),
        };

        match classify(&response) {
            ResponseClass::Success => Self::identity_outcome(&response),
            ResponseClass::SessionRejected => {
                log::info!(
                    "Session {} rejected by identity endpoint",
                    mask_session_id(session_id)
                );
                ValidationOutcome::invalid(ERR_SESSION_INVALID)
            }
            ResponseClass::TokenRejected => self.retry_with_fresh_token(session_id).await,
            ResponseClass::Forbidden => ValidationOutcome::invalid(ERR_FORBIDDEN),
            ResponseClass::Unexpected(status) => ValidationOutcome::unexpected_status(status),
        }
    }

    /// The single permitted retry after an anti-forgery rejection
    async fn retry_with_fresh_token(&self, session_id: &str) -> ValidationOutcome {
        LoggingHelper::log_token_retry("validation", &self.identity, session_id);

        let Ok(token) = self.acquirer.acquire(session_id).await else {
            return ValidationOutcome::invalid(ERR_TOKEN_RETRY_FAILED);
        };

        match self.request_identity(session_id, &token).await {
            Ok(response) if response.is_success() => Self::identity_outcome(&response),
            Ok(response) => {
                log::warn!(
                    "Identity retry for session {} still failed with status {}",
                    mask_session_id(session_id),
                    response.status
                );
                ValidationOutcome::invalid(ERR_TOKEN_RETRY_FAILED)
            }
            Err(err) => ValidationOutcome::invalid(err.to_string()),
        }
    }

    async fn request_identity(
        &self,
        session_id: &str,
        token: &str,
    ) -> Result<UpstreamResponse, TransportError> {
        LoggingHelper::log_endpoint_attempt("validation", &self.identity, session_id);
        let request = self
            .profile
            .build_request(&self.identity, session_id, Some(token));
        self.transport.send(request).await.inspect_err(|err| {
            LoggingHelper::log_transport_failure(&self.identity, err);
        })
    }

    fn identity_outcome(response: &UpstreamResponse) -> ValidationOutcome {
        match serde_json::from_str::<AuthenticatedUser>(&response.body) {
            Ok(user) => ValidationOutcome::authenticated(user),
            Err(err) => {
                log::warn!("Identity endpoint accepted session but body was unreadable: {err}");
                ValidationOutcome::authenticated_anonymous()
            }
        }
    }
}
