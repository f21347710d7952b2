//! Cross-origin policy for browser clients.
//!
//! With no configured origins every origin is allowed, which suits local
//! development. Listing origins restricts credentialed requests to them.

use actix_cors::Cors;
use actix_web::http::{Method, header};

use crate::domain::TRACE_ID_HEADER;

/// Seconds browsers may cache a preflight answer.
const PREFLIGHT_MAX_AGE_SECS: usize = 3600;

/// Build the CORS middleware for `allowed_origins`.
///
/// Each worker needs its own instance, so call this inside the
/// `HttpServer` factory closure.
///
/// ```
/// use agriscope_backend::inbound::http::cors_policy;
///
/// let open = cors_policy(&[]);
/// let restricted = cors_policy(&["https://agriscope.example".to_owned()]);
/// # drop((open, restricted));
/// ```
#[must_use]
pub fn cors_policy(allowed_origins: &[String]) -> Cors {
    if allowed_origins.is_empty() {
        return Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_headers([TRACE_ID_HEADER])
            .max_age(PREFLIGHT_MAX_AGE_SECS);
    }

    allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allowed_header(TRACE_ID_HEADER)
        .expose_headers([TRACE_ID_HEADER])
        .supports_credentials()
        .max_age(PREFLIGHT_MAX_AGE_SECS)
}
