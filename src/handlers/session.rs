//! Validate and refresh endpoints
//!
//! Both handlers are thin: they pull the cookie out of the JSON body, hand it
//! to the [`SessionKeeper`] and serialise whatever outcome comes back. Upstream
//! failures are part of the outcome, so these always answer 200 once the
//! request itself is well formed.

use crate::models::SessionRequest;
use crate::session::SessionKeeper;
use crate::utils::responses::ResponseBuilder;
use actix_web::{error::InternalError, web, HttpResponse, Result};
use log::debug;

/// Validate a session cookie against the platform
///
/// # Errors
/// Never in practice; the outcome carries any upstream failure
pub async fn validate_session(
    request: web::Json<SessionRequest>,
    keeper: web::Data<SessionKeeper>,
) -> Result<HttpResponse> {
    if request.cookie.trim().is_empty() {
        return Ok(ResponseBuilder::missing_field("cookie"));
    }
    let outcome = keeper.validate(&request.cookie).await;
    debug!("Validation finished: valid={}", outcome.valid);
    Ok(ResponseBuilder::ok(&outcome))
}

/// Extend the lifetime of a session cookie
///
/// # Errors
/// Never in practice; the outcome carries any upstream failure
pub async fn refresh_session(
    request: web::Json<SessionRequest>,
    keeper: web::Data<SessionKeeper>,
) -> Result<HttpResponse> {
    if request.cookie.trim().is_empty() {
        return Ok(ResponseBuilder::missing_field("cookie"));
    }
    let outcome = keeper.refresh(&request.cookie).await;
    debug!("Refresh finished: refreshed={}", outcome.refreshed);
    Ok(ResponseBuilder::ok(&outcome))
}

/// JSON extractor config that reports malformed bodies in the API error shape
#[must_use]
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = ResponseBuilder::bad_request()
            .with_error_code("invalid_request")
            .with_message(&err.to_string())
            .build();
        InternalError::from_response(err, response).into()
    })
}
