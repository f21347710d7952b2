//! Vegetation index API handlers.
//!
//! ```text
//! GET  /api/indices/list        List supported indices
//! POST /api/indices/calculate   Render an index composite as map tiles
//! POST /api/indices/timeseries  Sample an index per acquisition
//! ```

use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, post, web};

use crate::domain::catalogue;
use crate::inbound::http::ApiResult;
use crate::inbound::http::indices_dto::{
    IndexListResponse, IndexMapResponse, IndexMetadataResponse, IndexRequest,
    IndexTimeSeriesResponse, parse_index_request,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// List the supported vegetation indices with formulas and palettes.
#[utoipa::path(
    get,
    path = "/api/indices/list",
    responses(
        (status = 200, description = "Supported indices", body = IndexListResponse)
    ),
    tags = ["indices"],
    operation_id = "listIndices"
)]
#[get("/indices/list")]
pub async fn list_indices() -> HttpResponse {
    let indices: BTreeMap<String, IndexMetadataResponse> = catalogue()
        .into_iter()
        .map(|definition| {
            (
                definition.name.code().to_owned(),
                definition.metadata().into(),
            )
        })
        .collect();
    let total_count = indices.len();
    HttpResponse::Ok().json(IndexListResponse {
        indices,
        total_count,
    })
}

/// Render the mean index composite over the AOI and return a tile template.
///
/// # Errors
///
/// - `400 Bad Request`: missing body or field, invalid polygon, malformed or
///   too recent dates, unsupported index.
/// - `404 Not Found`: no scenes matched the AOI, window and cloud filter.
/// - `503 Service Unavailable`: the geospatial engine is unreachable.
#[utoipa::path(
    post,
    path = "/api/indices/calculate",
    request_body = IndexRequest,
    responses(
        (status = 200, description = "Index map rendered", body = IndexMapResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "No imagery", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Geospatial engine unavailable", body = ErrorSchema)
    ),
    tags = ["indices"],
    operation_id = "calculateIndex"
)]
#[post("/indices/calculate")]
pub async fn calculate_index(
    state: web::Data<HttpState>,
    payload: web::Json<IndexRequest>,
) -> ApiResult<web::Json<IndexMapResponse>> {
    let query = parse_index_request(payload.into_inner(), None)?;
    let outcome = state.vegetation.render_map(query).await?;
    Ok(web::Json(outcome.into()))
}

/// Sample the index once per acquisition over the AOI.
///
/// Scenes whose pixels are fully masked are dropped; the remaining points are
/// sorted by date.
///
/// # Errors
///
/// Same as [`calculate_index`].
#[utoipa::path(
    post,
    path = "/api/indices/timeseries",
    request_body = IndexRequest,
    responses(
        (status = 200, description = "Index time series", body = IndexTimeSeriesResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "No imagery", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Geospatial engine unavailable", body = ErrorSchema)
    ),
    tags = ["indices"],
    operation_id = "indexTimeSeries"
)]
#[post("/indices/timeseries")]
pub async fn index_time_series(
    state: web::Data<HttpState>,
    payload: web::Json<IndexRequest>,
) -> ApiResult<web::Json<IndexTimeSeriesResponse>> {
    let query = parse_index_request(payload.into_inner(), None)?;
    let outcome = state.vegetation.time_series(query).await?;
    Ok(web::Json(outcome.into()))
}
