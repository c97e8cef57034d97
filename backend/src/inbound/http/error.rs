//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes. Extractor failures (malformed JSON, query strings or paths) are
//! rewritten into the same field-map `validation` payload the domain uses.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::Internal) {
        let mut redacted = Error::internal(REDACTED_MESSAGE);
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
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED_MESSAGE)
    }
}

/// Field named by a serde message of the form "missing field `x`" or
/// "unknown field `x`", if any.
fn field_in_message(message: &str) -> Option<&str> {
    let rest = message
        .strip_prefix("missing field ")
        .or_else(|| message.strip_prefix("unknown field "))?;
    let (_, rest) = rest.split_once('`')?;
    let (field, _) = rest.split_once('`')?;
    Some(field).filter(|field| !field.is_empty())
}

/// Rule for a serde decoding failure, mirroring the domain rule vocabulary.
fn rule_for(message: &str) -> &'static str {
    if message.starts_with("missing field") {
        "required"
    } else {
        "type"
    }
}

fn decoding_error(fallback_field: &str, message: &str) -> Error {
    let field = field_in_message(message).unwrap_or(fallback_field);
    Error::invalid_field(field, rule_for(message))
}

/// Rewrite JSON body extraction failures into `validation` errors.
pub(crate) fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected JSON payload");
    let domain = match &err {
        JsonPayloadError::Deserialize(source) => {
            let message = source.to_string();
            if source.is_data() {
                decoding_error("body", &message)
            } else {
                Error::invalid_field("body", "json")
            }
        }
        JsonPayloadError::ContentType => Error::invalid_field("body", "content_type"),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            Error::invalid_field("body", "size")
        }
        _ => Error::invalid_field("body", "json"),
    };
    domain.into()
}

/// Rewrite query string extraction failures into `validation` errors.
pub(crate) fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected query string");
    let domain = match &err {
        QueryPayloadError::Deserialize(source) => decoding_error("query", &source.to_string()),
        _ => Error::invalid_field("query", "type"),
    };
    domain.into()
}

/// Rewrite path segment extraction failures into `validation` errors.
pub(crate) fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected path segment");
    Error::invalid_field("beerId", "type").into()
}

#[cfg(test)]
mod tests;
