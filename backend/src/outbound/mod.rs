//! Outbound adapters implementing domain ports for remote services.
//!
//! - **earth_engine**: Earth Engine REST client for index maps, index time
//!   series, and session checks.
//! - **gemini**: Gemini `generateContent` client for crop advice.
//! - **nasa_power**: NASA POWER daily point client for field weather.
//! - **metrics**: Prometheus registry wiring (feature-gated).
//!
//! Adapters are thin translators between domain types and wire formats.
//! They contain no business logic.

pub mod earth_engine;
pub mod gemini;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod nasa_power;
