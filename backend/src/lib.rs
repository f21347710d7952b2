//! AgriScope backend library modules.
//!
//! The crate is a hexagonal service: `domain` owns validation, the index
//! catalogue, prompt templating and the driven ports; `inbound` exposes the
//! HTTP surface; `outbound` talks to Earth Engine and Gemini.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
