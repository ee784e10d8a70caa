//! JSON responses for the HTTP layer
//!
//! Outcomes go out as 200 with the outcome record as body. Malformed
//! requests get a 400 with an `{error, message}` body; the generic one is
//! serialised once and reused.

use actix_web::{http::header, HttpResponse};
use serde_json::json;

const INVALID_REQUEST: &str = "invalid_request";
const INVALID_REQUEST_MESSAGE: &str = "The request is malformed or invalid";

static INVALID_REQUEST_BODY: std::sync::LazyLock<String> =
    std::sync::LazyLock::new(|| error_body(INVALID_REQUEST, INVALID_REQUEST_MESSAGE));

fn error_body(error: &str, message: &str) -> String {
    json!({
        "error": error,
        "message": message
    })
    .to_string()
}

pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Start a 400 response; without customisation it uses the cached body
    #[must_use]
    pub const fn bad_request() -> BadRequestBuilder {
        BadRequestBuilder {
            error_code: None,
            message: None,
        }
    }

    /// 200 with a JSON-serialised body
    #[must_use]
    pub fn ok<T: serde::Serialize>(data: &T) -> HttpResponse {
        HttpResponse::Ok().json(data)
    }

    /// 400 naming the required field that was absent or blank
    #[must_use]
    pub fn missing_field(field_name: &str) -> HttpResponse {
        Self::bad_request()
            .with_error_code("missing_field")
            .with_message(&format!("Missing required field: {field_name}"))
            .build()
    }
}

pub struct BadRequestBuilder {
    error_code: Option<String>,
    message: Option<String>,
}

impl BadRequestBuilder {
    #[must_use]
    pub fn with_error_code(mut self, code: &str) -> Self {
        self.error_code = Some(code.to_string());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    #[must_use]
    pub fn build(self) -> HttpResponse {
        let body = match (self.error_code, self.message) {
            (None, None) => INVALID_REQUEST_BODY.clone(),
            (code, message) => error_body(
                code.as_deref().unwrap_or(INVALID_REQUEST),
                message.as_deref().unwrap_or(INVALID_REQUEST_MESSAGE),
            ),
        };
        HttpResponse::BadRequest()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(body)
    }
}
