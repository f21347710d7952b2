//! Vegetation index DTOs and parsing helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, IndexMapOutcome, IndexMetadata, IndexName, IndexQuery, IndexSeriesOutcome,
    VisualizationParams, missing_field_error,
};
use crate::inbound::http::error::NO_INPUT_MESSAGE;

/// Request payload shared by the index endpoints.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct IndexRequest {
    /// Polygon vertices as `[lng, lat]` pairs.
    #[schema(example = json!([[-93.098, 41.878], [-93.088, 41.878], [-93.088, 41.888]]))]
    pub coordinates: Option<Vec<Vec<f64>>>,
    /// First acquisition day.
    #[schema(example = "2025-06-01")]
    pub start_date: Option<String>,
    /// Exclusive end day.
    #[schema(example = "2025-07-31")]
    pub end_date: Option<String>,
    /// Index code; defaults to `NDVI`.
    #[schema(example = "EVI")]
    pub index_name: Option<String>,
}

impl IndexRequest {
    fn is_empty(&self) -> bool {
        self.coordinates.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.index_name.is_none()
    }
}

/// Convert a request body into a domain query.
///
/// `forced_index` overrides any caller-supplied index, as the legacy NDVI
/// endpoints do.
pub(super) fn parse_index_request(
    request: IndexRequest,
    forced_index: Option<IndexName>,
) -> Result<IndexQuery, Error> {
    if request.is_empty() {
        return Err(Error::invalid_request(NO_INPUT_MESSAGE));
    }
    let IndexRequest {
        coordinates,
        start_date,
        end_date,
        index_name,
    } = request;
    let coordinates = coordinates.ok_or_else(|| missing_field_error("coordinates"))?;
    let start_date = start_date.ok_or_else(|| missing_field_error("start_date"))?;
    let end_date = end_date.ok_or_else(|| missing_field_error("end_date"))?;
    let index_name = match forced_index {
        Some(index) => Some(index.code().to_owned()),
        None => index_name,
    };
    Ok(IndexQuery {
        coordinates,
        start_date,
        end_date,
        index_name,
    })
}

/// Tile rendering parameters.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VisualizationParamsResponse {
    #[schema(example = json!(-0.2))]
    pub min: f64,
    #[schema(example = 1.0)]
    pub max: f64,
    #[schema(example = json!(["blue", "white", "yellow", "green", "darkgreen"]))]
    pub palette: Vec<String>,
}

impl From<VisualizationParams> for VisualizationParamsResponse {
    fn from(params: VisualizationParams) -> Self {
        let VisualizationParams { min, max, palette } = params;
        Self { min, max, palette }
    }
}

/// Metadata describing one index.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IndexMetadataResponse {
    #[schema(example = "Normalized Difference Vegetation Index")]
    pub name: String,
    pub description: String,
    #[schema(example = "(NIR - RED) / (NIR + RED)")]
    pub formula: String,
    #[schema(example = json!(["B4", "B8"]))]
    pub bands: Vec<String>,
    /// Theoretical `[min, max]`.
    #[schema(example = json!([-1.0, 1.0]))]
    pub range: Vec<f64>,
    pub visualization: VisualizationParamsResponse,
}

impl From<IndexMetadata> for IndexMetadataResponse {
    fn from(metadata: IndexMetadata) -> Self {
        Self {
            name: metadata.name,
            description: metadata.description,
            formula: metadata.formula,
            bands: metadata.bands,
            range: metadata.range.to_vec(),
            visualization: metadata.visualization.into(),
        }
    }
}

/// Catalogue of supported indices keyed by code.
#[derive(Debug, Serialize, ToSchema)]
pub struct IndexListResponse {
    pub indices: BTreeMap<String, IndexMetadataResponse>,
    #[schema(example = 6)]
    pub total_count: usize,
}

/// Rendered index map.
#[derive(Debug, Serialize, ToSchema)]
pub struct IndexMapResponse {
    #[schema(example = "success")]
    pub status: String,
    #[schema(example = "NDVI")]
    pub index_name: String,
    /// XYZ tile template with `{z}`, `{x}` and `{y}` placeholders.
    pub tile_url: String,
    pub map_id: String,
    pub visualization_params: VisualizationParamsResponse,
    pub start_date: String,
    pub end_date: String,
    pub coordinates: Vec<Vec<f64>>,
}

impl From<IndexMapOutcome> for IndexMapResponse {
    fn from(outcome: IndexMapOutcome) -> Self {
        let coordinates = echo_coordinates(&outcome);
        Self {
            status: "success".to_owned(),
            index_name: outcome.index.code().to_owned(),
            tile_url: outcome.tile_url,
            map_id: outcome.map_id,
            visualization_params: outcome.visualization.into(),
            start_date: outcome.window.start_str(),
            end_date: outcome.window.end_str(),
            coordinates,
        }
    }
}

fn echo_coordinates(outcome: &IndexMapOutcome) -> Vec<Vec<f64>> {
    outcome
        .aoi
        .to_pairs()
        .into_iter()
        .map(|pair| pair.to_vec())
        .collect()
}

/// One point in an index time series.
#[derive(Debug, Serialize, ToSchema)]
pub struct TimeSeriesPoint {
    #[schema(example = "2025-06-14")]
    pub date: String,
    #[schema(example = 0.61)]
    pub value: f64,
}

/// Index time series.
#[derive(Debug, Serialize, ToSchema)]
pub struct IndexTimeSeriesResponse {
    #[schema(example = "success")]
    pub status: String,
    #[schema(example = "NDVI")]
    pub index_name: String,
    pub time_series: Vec<TimeSeriesPoint>,
    pub total_measurements: usize,
}

impl From<IndexSeriesOutcome> for IndexTimeSeriesResponse {
    fn from(outcome: IndexSeriesOutcome) -> Self {
        let total_measurements = outcome.total_measurements();
        Self {
            status: "success".to_owned(),
            index_name: outcome.index.code().to_owned(),
            time_series: outcome
                .points
                .into_iter()
                .map(|point| TimeSeriesPoint {
                    date: point.date.format("%Y-%m-%d").to_string(),
                    value: point.value,
                })
                .collect(),
            total_measurements,
        }
    }
}

/// Legacy NDVI map response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LegacyNdviMapResponse {
    #[schema(example = "success")]
    pub status: String,
    pub start_date: String,
    pub end_date: String,
    pub coordinates: Vec<Vec<f64>>,
    pub tile_url: String,
}

impl From<IndexMapOutcome> for LegacyNdviMapResponse {
    fn from(outcome: IndexMapOutcome) -> Self {
        Self {
            status: "success".to_owned(),
            start_date: outcome.window.start_str(),
            end_date: outcome.window.end_str(),
            coordinates: echo_coordinates(&outcome),
            tile_url: outcome.tile_url,
        }
    }
}

/// One point in the legacy NDVI series.
#[derive(Debug, Serialize, ToSchema)]
pub struct LegacyNdviPoint {
    #[schema(example = "2025-06-14")]
    pub date: String,
    #[schema(example = 0.61)]
    pub ndvi: f64,
}

/// Legacy NDVI time series response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LegacyNdviSeriesResponse {
    #[schema(example = "success")]
    pub status: String,
    pub time_series: Vec<LegacyNdviPoint>,
}

impl From<IndexSeriesOutcome> for LegacyNdviSeriesResponse {
    fn from(outcome: IndexSeriesOutcome) -> Self {
        Self {
            status: "success".to_owned(),
            time_series: outcome
                .points
                .into_iter()
                .map(|point| LegacyNdviPoint {
                    date: point.date.format("%Y-%m-%d").to_string(),
                    ndvi: point.value,
                })
                .collect(),
        }
    }
}
