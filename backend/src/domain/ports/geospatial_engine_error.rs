//! Failure modes shared by the geospatial engine ports.

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while talking to the remote geospatial engine.
    pub enum GeospatialEngineError {
        /// Network transport failed or the engine answered with a 5xx.
        Transport { message: String } =>
            "geospatial engine transport failed: {message}",
        /// The engine did not answer in time.
        Timeout { message: String } =>
            "geospatial engine timeout: {message}",
        /// The engine throttled the request.
        RateLimited { message: String } =>
            "geospatial engine rate limited request: {message}",
        /// Credentials were missing, expired, or refused.
        Unauthenticated { message: String } =>
            "geospatial engine authentication failed: {message}",
        /// The engine rejected the computation as invalid.
        Rejected { message: String } =>
            "geospatial engine rejected request: {message}",
        /// The engine answered with an unexpected payload.
        Decode { message: String } =>
            "geospatial engine response decode failed: {message}",
        /// No scenes matched the area, window, and cloud filter.
        NoImagery =>
            "no imagery matched the request",
    }
    retryable = [Transport, Timeout, RateLimited];
}

impl GeospatialEngineError {
    /// Short failure kind used as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::RateLimited { .. } => "rate_limited",
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Rejected { .. } => "rejected",
            Self::Decode { .. } => "decode",
            Self::NoImagery => "no_imagery",
        }
    }
}
