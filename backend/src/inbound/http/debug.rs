//! Debug status endpoint.
//!
//! ```text
//! GET /api/debug/status  Configuration summary and readiness
//! ```
//!
//! Credentials are reported as truncated SHA-256 fingerprints so operators
//! can tell which key is active without exposing key material.

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::HttpState;

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Truncated SHA-256 fingerprint of a secret as 16 hex characters.
///
/// # Examples
///
/// ```rust
/// use agriscope_backend::inbound::http::debug::secret_fingerprint;
///
/// let fp = secret_fingerprint("api-key");
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

/// Earth Engine settings in effect.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EngineSummary {
    #[schema(example = "agriscope21")]
    pub project: String,
    #[schema(example = "COPERNICUS/S2_SR")]
    pub collection: String,
    pub api_base: String,
    /// `service_account` or `access_token`.
    #[schema(example = "service_account")]
    pub credentials: String,
    pub credential_fingerprint: Option<String>,
    #[schema(example = 20.0)]
    pub cloud_threshold: f64,
}

/// Language model settings in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ModelSummary {
    pub configured: bool,
    #[schema(example = "gemini-1.5-flash")]
    pub model: String,
    pub api_key_fingerprint: Option<String>,
}

/// Configuration summary built once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ServiceSummary {
    pub earth_engine: EngineSummary,
    pub gemini: ModelSummary,
    /// Daily weather archive endpoint.
    #[schema(example = "https://power.larc.nasa.gov/api/temporal/daily/point")]
    pub weather_api: String,
    #[schema(example = 3)]
    pub latency_days: u32,
}

impl ServiceSummary {
    /// Summary describing the in-process fixtures.
    pub fn fixture() -> Self {
        Self {
            earth_engine: EngineSummary {
                project: "fixture".to_owned(),
                collection: "COPERNICUS/S2_SR".to_owned(),
                api_base: "https://tiles.invalid/".to_owned(),
                credentials: "fixture".to_owned(),
                credential_fingerprint: None,
                cloud_threshold: 20.0,
            },
            gemini: ModelSummary {
                configured: true,
                model: "fixture".to_owned(),
                api_key_fingerprint: None,
            },
            weather_api: "https://weather.invalid/".to_owned(),
            latency_days: crate::domain::DEFAULT_LATENCY_DAYS,
        }
    }
}

/// Debug status payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct DebugStatusResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub version: String,
    /// Whether the engine session was established at startup.
    pub ready: bool,
    #[serde(flatten)]
    pub summary: ServiceSummary,
}

/// Report configuration and readiness for operators.
#[utoipa::path(
    get,
    path = "/api/debug/status",
    responses(
        (status = 200, description = "Configuration summary", body = DebugStatusResponse)
    ),
    tags = ["debug"],
    operation_id = "debugStatus"
)]
#[get("/debug/status")]
pub async fn debug_status(
    state: web::Data<HttpState>,
    health: web::Data<HealthState>,
) -> HttpResponse {
    let body = DebugStatusResponse {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        ready: health.is_ready(),
        summary: state.summary.as_ref().clone(),
    };
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fingerprint_is_deterministic_and_distinct() {
        assert_eq!(secret_fingerprint("alpha"), secret_fingerprint("alpha"));
        assert_ne!(secret_fingerprint("alpha"), secret_fingerprint("beta"));
    }

    #[rstest]
    fn fingerprint_matches_sha256_prefix() {
        // SHA-256("abc") = ba7816bf8f01cfea...
        assert_eq!(secret_fingerprint("abc"), "ba7816bf8f01cfea");
    }
}
