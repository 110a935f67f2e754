//! HTTP mapping for the API error payload.
//!
//! Keeps [`Error`] transport-agnostic while letting Actix handlers return it
//! directly. Internal errors are redacted before they reach the client.

use actix_web::error::{JsonPayloadError, PayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

/// Convert a rejected JSON body into the API error shape.
///
/// Installed through `web::JsonConfig::error_handler` so oversized or
/// unparsable bodies answer with the same payload as every other failure.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected JSON body");
    let error = match &err {
        JsonPayloadError::OverflowKnownLength { limit, .. }
        | JsonPayloadError::Overflow { limit } => payload_too_large(*limit),
        JsonPayloadError::ContentType => Error::invalid_request("expected application/json body")
            .with_details(json!({ "field": "/", "code": "content_type" })),
        _ => Error::invalid_request("request body is not valid JSON")
            .with_details(json!({ "field": "/", "code": "malformed" })),
    };
    error.into()
}

/// Convert a rejected query string into the API error shape.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": "query", "code": "malformed" }))
        .into()
}

/// Convert a raw body read failure into the API error shape.
pub(crate) fn payload_error(err: PayloadError, limit: usize) -> Error {
    match err {
        PayloadError::Overflow => payload_too_large(limit),
        other => {
            debug!(error = %other, "failed to read request body");
            Error::invalid_request("request body could not be read")
                .with_details(json!({ "field": "/", "code": "malformed" }))
        }
    }
}

fn payload_too_large(limit: usize) -> Error {
    Error::invalid_request(format!("request body exceeds {limit} bytes"))
        .with_details(json!({ "field": "/", "code": "payload_too_large", "limit": limit }))
}

#[cfg(test)]
mod tests;
