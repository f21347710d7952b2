//! NDVI-only endpoints kept for existing map clients.
//!
//! ```text
//! POST /process_ndvi      NDVI composite tiles
//! POST /ndvi_time_series  NDVI per acquisition, keyed `ndvi`
//! ```
//!
//! Any `index_name` in the body is ignored.

use actix_web::{post, web};

use crate::domain::IndexName;
use crate::inbound::http::ApiResult;
use crate::inbound::http::indices_dto::{
    IndexRequest, LegacyNdviMapResponse, LegacyNdviSeriesResponse, parse_index_request,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Render the mean NDVI composite over the AOI.
#[utoipa::path(
    post,
    path = "/process_ndvi",
    request_body = IndexRequest,
    responses(
        (status = 200, description = "NDVI map rendered", body = LegacyNdviMapResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "No imagery", body = ErrorSchema),
        (status = 503, description = "Geospatial engine unavailable", body = ErrorSchema)
    ),
    tags = ["legacy"],
    operation_id = "processNdvi"
)]
#[post("/process_ndvi")]
pub async fn process_ndvi(
    state: web::Data<HttpState>,
    payload: web::Json<IndexRequest>,
) -> ApiResult<web::Json<LegacyNdviMapResponse>> {
    let query = parse_index_request(payload.into_inner(), Some(IndexName::Ndvi))?;
    let outcome = state.vegetation.render_map(query).await?;
    Ok(web::Json(outcome.into()))
}

/// Sample NDVI once per acquisition over the AOI.
#[utoipa::path(
    post,
    path = "/ndvi_time_series",
    request_body = IndexRequest,
    responses(
        (status = 200, description = "NDVI time series", body = LegacyNdviSeriesResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "No imagery", body = ErrorSchema),
        (status = 503, description = "Geospatial engine unavailable", body = ErrorSchema)
    ),
    tags = ["legacy"],
    operation_id = "ndviTimeSeries"
)]
#[post("/ndvi_time_series")]
pub async fn ndvi_time_series(
    state: web::Data<HttpState>,
    payload: web::Json<IndexRequest>,
) -> ApiResult<web::Json<LegacyNdviSeriesResponse>> {
    let query = parse_index_request(payload.into_inner(), Some(IndexName::Ndvi))?;
    let outcome = state.vegetation.time_series(query).await?;
    Ok(web::Json(outcome.into()))
}
