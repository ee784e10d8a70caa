use super::SessionValidator;
use crate::models::outcome::{
    RefreshOutcome, ERR_AUTHENTICATION, ERR_NO_TOKEN, ERR_SESSION_INVALID,
};
use crate::platform::{
    classify, is_refresh_success, rotated_session, BrowserProfile, Endpoint, ResponseClass,
};
use crate::token::{TokenAcquirer, TokenCache};
use crate::transport::{TransportError, UpstreamResponse, UpstreamTransport};
use crate::utils::logging::{mask_session_id, LoggingHelper};
use std::sync::Arc;

/// What a single endpoint attempt concluded
enum Attempt {
    /// The session was extended; carries the cookie to hand back
    Refreshed(String),
    /// The session is definitely dead
    SessionRejected,
    /// Nothing conclusive, move on
    Inconclusive,
}

/// Extends a session's lifetime by walking the session-extending endpoints
///
/// The first 200/201/204 wins. A 401 ends the walk. An anti-forgery
/// rejection earns the endpoint one retry with a refetched token. When the
/// list runs out without a verdict the session is reported as refreshed with
/// an "unconfirmed" warning, unless the last status seen was a 401 or 403.
pub struct SessionRefresher {
    transport: Arc<dyn UpstreamTransport>,
    cache: Arc<TokenCache>,
    acquirer: Arc<TokenAcquirer>,
    validator: Arc<SessionValidator>,
    profile: BrowserProfile,
    endpoints: Vec<Endpoint>,
}

impl SessionRefresher {
    #[must_use]
    pub fn new(
        transport: Arc<dyn UpstreamTransport>,
        cache: Arc<TokenCache>,
        acquirer: Arc<TokenAcquirer>,
        validator: Arc<SessionValidator>,
        profile: BrowserProfile,
        endpoints: Vec<Endpoint>,
    ) -> Self {
        Self {
            transport,
            cache,
            acquirer,
            validator,
            profile,
            endpoints,
        }
    }

    pub async fn refresh(&self, session_id: &str) -> RefreshOutcome {
        let mut token = match self.ensure_token(session_id).await {
            Ok(token) => token,
            Err(outcome) => return outcome,
        };

        let mut last_status: Option<u16> = None;

        for endpoint in &self.endpoints {
            match self
                .attempt(endpoint, session_id, &mut token, &mut last_status)
                .await
            {
                Attempt::Refreshed(cookie) => {
                    log::info!(
                        "Session {} refreshed via {}",
                        mask_session_id(session_id),
                        endpoint.description
                    );
                    return RefreshOutcome::refreshed(cookie);
                }
                Attempt::SessionRejected => return RefreshOutcome::failed(ERR_SESSION_INVALID),
                Attempt::Inconclusive => {}
            }
        }

        if matches!(last_status, Some(401 | 403)) {
            log::warn!(
                "All refresh endpoints failed for session {}, last status {last_status:?}",
                mask_session_id(session_id)
            );
            RefreshOutcome::failed(ERR_AUTHENTICATION)
        } else {
            log::warn!(
                "No refresh endpoint confirmed session {}; assuming it is still alive",
                mask_session_id(session_id)
            );
            RefreshOutcome::unconfirmed(session_id)
        }
    }

    /// Cached token, or one obtained by validating the session first
    async fn ensure_token(&self, session_id: &str) -> Result<String, RefreshOutcome> {
        if let Some(token) = self.cache.lookup(session_id) {
            return Ok(token);
        }

        let validation = self.validator.validate(session_id).await;
        if !validation.valid {
            return Err(RefreshOutcome::failed(
                validation
                    .error
                    .unwrap_or_else(|| ERR_SESSION_INVALID.to_string()),
            ));
        }

        if let Some(token) = self.cache.lookup(session_id) {
            return Ok(token);
        }

        self.acquirer
            .acquire(session_id)
            .await
            .map_err(|_| RefreshOutcome::failed(ERR_NO_TOKEN))
    }

    async fn attempt(
        &self,
        endpoint: &Endpoint,
        session_id: &str,
        token: &mut String,
        last_status: &mut Option<u16>,
    ) -> Attempt {
        let Ok(response) = self.send(endpoint, session_id, token).await else {
            return Attempt::Inconclusive;
        };
        *last_status = Some(response.status);

        if is_refresh_success(response.status) {
            return Attempt::Refreshed(self.confirmed_cookie(session_id, token, &response));
        }

        match classify(&response) {
            ResponseClass::SessionRejected => Attempt::SessionRejected,
            ResponseClass::TokenRejected => {
                LoggingHelper::log_token_retry("refresh", endpoint, session_id);
                let Ok(fresh) = self.acquirer.acquire(session_id).await else {
                    return Attempt::Inconclusive;
                };
                *token = fresh;

                match self.send(endpoint, session_id, token).await {
                    Ok(retry) => {
                        *last_status = Some(retry.status);
                        if is_refresh_success(retry.status) {
                            Attempt::Refreshed(self.confirmed_cookie(session_id, token, &retry))
                        } else {
                            LoggingHelper::log_endpoint_skipped(
                                endpoint,
                                retry.status,
                                "retry with fresh token did not succeed",
                            );
                            Attempt::Inconclusive
                        }
                    }
                    Err(_) => Attempt::Inconclusive,
                }
            }
            _ => {
                LoggingHelper::log_endpoint_skipped(
                    endpoint,
                    response.status,
                    "status does not confirm the session",
                );
                Attempt::Inconclusive
            }
        }
    }

    async fn send(
        &self,
        endpoint: &Endpoint,
        session_id: &str,
        token: &str,
    ) -> Result<UpstreamResponse, TransportError> {
        LoggingHelper::log_endpoint_attempt("refresh", endpoint, session_id);
        let request = self.profile.build_request(endpoint, session_id, Some(token));
        self.transport.send(request).await.inspect_err(|err| {
            LoggingHelper::log_transport_failure(endpoint, err);
        })
    }

    /// Cookie to return after a confirmed refresh. A rotated session takes
    /// over the current token so the next call does not re-acquire.
    fn confirmed_cookie(
        &self,
        session_id: &str,
        token: &str,
        response: &UpstreamResponse,
    ) -> String {
        match rotated_session(response) {
            Some(rotated) if rotated != session_id => {
                log::info!(
                    "Session {} rotated to {}",
                    mask_session_id(session_id),
                    mask_session_id(&rotated)
                );
                self.cache.store(&rotated, token);
                rotated
            }
            _ => session_id.to_string(),
        }
    }
}
