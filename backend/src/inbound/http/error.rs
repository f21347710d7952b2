//! Actix mapping for API errors.
//!
//! Handlers return [`ApiResult`]; this module turns the domain [`Error`] into
//! a JSON body and status. Internal failures are logged in full and reach the
//! client only as a generic message carrying the trace id.

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Message returned when a JSON endpoint receives no body.
pub const NO_INPUT_MESSAGE: &str = "No input data provided";

const INTERNAL_MESSAGE: &str = "Internal server error";

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        response.insert_header((header::CACHE_CONTROL, "no-store"));
        if let Some(id) = self.trace_id() {
            response.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        response.json(public_view(self))
    }
}

/// The payload a client may see for `error`.
fn public_view(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    error!(
        trace_id = error.trace_id().unwrap_or("-"),
        message = error.message(),
        "internal error redacted from response"
    );
    let redacted = Error::internal(INTERNAL_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to API error");
        Error::internal(INTERNAL_MESSAGE)
    }
}

/// Map JSON extractor failures onto the API error payload.
///
/// An empty or non-JSON body reports [`NO_INPUT_MESSAGE`]; malformed JSON
/// reports the parser message.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let error = match &err {
        JsonPayloadError::ContentType => Error::invalid_request(NO_INPUT_MESSAGE),
        JsonPayloadError::Deserialize(inner) if is_empty_body(inner) => {
            Error::invalid_request(NO_INPUT_MESSAGE)
        }
        JsonPayloadError::Deserialize(inner) => {
            Error::invalid_request(format!("invalid JSON body: {inner}"))
        }
        other => Error::invalid_request(format!("invalid request body: {other}")),
    };
    InternalError::from_response(err, error.error_response()).into()
}

fn is_empty_body(error: &serde_json::Error) -> bool {
    error.is_eof() && error.line() <= 1 && error.column() == 0
}
