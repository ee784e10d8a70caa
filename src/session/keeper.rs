//! Session Keeper - single entry point for validate and refresh
//!
//! The keeper is built once at process start and owns the token cache. All
//! components share one transport and one cache; nothing is global.

use super::{SessionRefresher, SessionValidator};
use crate::models::outcome::ERR_MISSING_COOKIE;
use crate::models::{RefreshOutcome, ValidationOutcome};
use crate::platform::{normalize_session_id, BrowserProfile};
use crate::settings::KeeperSettings;
use crate::token::{Clock, SystemClock, TokenAcquirer, TokenCache};
use crate::transport::{ReqwestTransport, TransportError, UpstreamTransport};
use std::sync::Arc;

#[derive(Clone)]
pub struct SessionKeeper {
    cache: Arc<TokenCache>,
    validator: Arc<SessionValidator>,
    refresher: Arc<SessionRefresher>,
}

impl SessionKeeper {
    /// Build a keeper talking to the real platform over `reqwest`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_settings(settings: &KeeperSettings) -> Result<Self, TransportError> {
        let transport = Arc::new(ReqwestTransport::from_settings(&settings.upstream)?);
        Ok(Self::with_transport(settings, transport, Box::new(SystemClock)))
    }

    #[must_use]
    pub fn with_transport(
        settings: &KeeperSettings,
        transport: Arc<dyn UpstreamTransport>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let profile = BrowserProfile::from_settings(&settings.upstream);
        let cache = Arc::new(TokenCache::new(settings.token.freshness_window(), clock));

        let acquirer = Arc::new(TokenAcquirer::new(
            Arc::clone(&transport),
            Arc::clone(&cache),
            profile.clone(),
            settings.endpoints.acquisition.clone(),
        ));
        let validator = Arc::new(SessionValidator::new(
            Arc::clone(&transport),
            Arc::clone(&acquirer),
            profile.clone(),
            settings.endpoints.identity.clone(),
        ));
        let refresher = Arc::new(SessionRefresher::new(
            transport,
            Arc::clone(&cache),
            acquirer,
            Arc::clone(&validator),
            profile,
            settings.endpoints.refresh.clone(),
        ));

        Self {
            cache,
            validator,
            refresher,
        }
    }

    pub async fn validate(&self, cookie: &str) -> ValidationOutcome {
        let session_id = normalize_session_id(cookie);
        if session_id.is_empty() {
            return ValidationOutcome::invalid(ERR_MISSING_COOKIE);
        }
        self.validator.validate(session_id).await
    }

    pub async fn refresh(&self, cookie: &str) -> RefreshOutcome {
        let session_id = normalize_session_id(cookie);
        if session_id.is_empty() {
            return RefreshOutcome::failed(ERR_MISSING_COOKIE);
        }
        self.refresher.refresh(session_id).await
    }

    #[must_use]
    pub fn token_cache(&self) -> &TokenCache {
        &self.cache
    }
}
