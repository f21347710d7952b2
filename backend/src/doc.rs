//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer together
//! with the schema wrappers ([`ErrorSchema`], [`ErrorCodeSchema`]) that
//! describe domain errors without coupling domain types to utoipa.
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AgriScope backend API",
        description = "Vegetation index maps and time series for field polygons, \
                       daily field weather, AI crop recommendations and \
                       operational health checks."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::indices::list_indices,
        crate::inbound::http::indices::calculate_index,
        crate::inbound::http::indices::index_time_series,
        crate::inbound::http::legacy::process_ndvi,
        crate::inbound::http::legacy::ndvi_time_series,
        crate::inbound::http::crop_recommendations::crop_recommendations,
        crate::inbound::http::weather::weather_data,
        crate::inbound::http::debug::debug_status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "indices", description = "Vegetation index maps and time series"),
        (name = "legacy", description = "NDVI-only endpoints for existing clients"),
        (name = "crop-recommendations", description = "AI crop advice"),
        (name = "weather", description = "Daily field weather from NASA POWER"),
        (name = "debug", description = "Operational configuration summary"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
