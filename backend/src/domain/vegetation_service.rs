//! Vegetation index use-cases: map rendering and time-series sampling.
//!
//! The service validates caller input, builds engine requests, and maps
//! engine failures onto the API error taxonomy.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, warn};

use super::ports::{
    GeospatialEngineError, IndexMapRequest, IndexSeriesRequest, NoOpUpstreamCallMetrics,
    Upstream, UpstreamCallLabels, UpstreamCallMetrics, VegetationMapSource,
    VegetationSeriesSource,
};
use super::{
    AreaOfInterest, Error, IndexDefinition, IndexName, ObservationWindow, VisualizationParams,
};

/// Message returned when the collection is empty for a request.
pub const NO_IMAGERY_MESSAGE: &str = "No Sentinel-2 data available for the specified AOI and dates";

/// Default processing latency of the imagery archive, in days.
pub const DEFAULT_LATENCY_DAYS: u32 = 3;

/// Unvalidated index request as received from a caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexQuery {
    /// Polygon as `[lng, lat]` pairs.
    pub coordinates: Vec<Vec<f64>>,
    /// First acquisition day, `YYYY-MM-DD`.
    pub start_date: String,
    /// Exclusive end day, `YYYY-MM-DD`.
    pub end_date: String,
    /// Index code; `NDVI` when absent.
    pub index_name: Option<String>,
}

/// Rendered composite.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMapOutcome {
    /// Index that was rendered.
    pub index: IndexName,
    /// XYZ tile template.
    pub tile_url: String,
    /// Engine map identifier.
    pub map_id: String,
    /// Rendering parameters applied to the tiles.
    pub visualization: VisualizationParams,
    /// Validated window.
    pub window: ObservationWindow,
    /// Validated polygon.
    pub aoi: AreaOfInterest,
}

/// One retained time-series point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    /// Acquisition day.
    pub date: NaiveDate,
    /// Mean index value over the field.
    pub value: f64,
}

/// Sampled time series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSeriesOutcome {
    /// Index that was sampled.
    pub index: IndexName,
    /// Points in ascending date order.
    pub points: Vec<SeriesPoint>,
}

impl IndexSeriesOutcome {
    /// Number of retained measurements.
    pub fn total_measurements(&self) -> usize {
        self.points.len()
    }
}

struct PreparedQuery {
    aoi: AreaOfInterest,
    window: ObservationWindow,
    index: IndexDefinition,
}

/// Service orchestrating the vegetation index ports.
#[derive(Clone)]
pub struct VegetationIndexService {
    maps: Arc<dyn VegetationMapSource>,
    series: Arc<dyn VegetationSeriesSource>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn UpstreamCallMetrics>,
    latency_days: u32,
}

impl VegetationIndexService {
    /// Create a service over the given engine ports.
    pub fn new(
        maps: Arc<dyn VegetationMapSource>,
        series: Arc<dyn VegetationSeriesSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            maps,
            series,
            clock,
            metrics: Arc::new(NoOpUpstreamCallMetrics),
            latency_days: DEFAULT_LATENCY_DAYS,
        }
    }

    /// Record engine call outcomes with `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn UpstreamCallMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Override the archive latency used to reject too-recent windows.
    pub fn with_latency_days(mut self, latency_days: u32) -> Self {
        self.latency_days = latency_days;
        self
    }

    async fn record_outcome<T>(
        &self,
        operation: &'static str,
        result: &Result<T, GeospatialEngineError>,
    ) {
        let labels = UpstreamCallLabels {
            upstream: Upstream::EarthEngine,
            operation,
            outcome: result.as_ref().map_or_else(GeospatialEngineError::kind, |_| "success"),
        };
        if let Err(error) = self.metrics.record_call(&labels).await {
            debug!(error = %error, "failed to record engine call metric");
        }
    }

    fn prepare(&self, query: IndexQuery) -> Result<PreparedQuery, Error> {
        let index = match query.index_name.as_deref() {
            Some(raw) => IndexName::parse_field("index_name", raw)?,
            None => IndexName::default(),
        };
        let aoi = AreaOfInterest::try_from_coordinates(query.coordinates)?;
        let today = self.clock.utc().date_naive();
        let window =
            ObservationWindow::parse(&query.start_date, &query.end_date, today, self.latency_days)?;
        Ok(PreparedQuery {
            aoi,
            window,
            index: index.definition(),
        })
    }

    /// Render the mean index composite for the query.
    pub async fn render_map(&self, query: IndexQuery) -> Result<IndexMapOutcome, Error> {
        let PreparedQuery { aoi, window, index } = self.prepare(query)?;
        let request = IndexMapRequest {
            aoi,
            window,
            index,
        };

        let result = self.maps.render_index_map(&request).await;
        self.record_outcome("render_map", &result).await;
        let map = result.map_err(|error| map_engine_error(request.index.name, error))?;
        debug!(index = %request.index.name, map_id = %map.map_id, "rendered index map");

        let IndexMapRequest { aoi, window, index } = request;
        Ok(IndexMapOutcome {
            index: index.name,
            tile_url: map.tile_url,
            map_id: map.map_id,
            visualization: index.visualization,
            window,
            aoi,
        })
    }

    /// Sample the index once per scene, dropping fully masked scenes.
    pub async fn time_series(&self, query: IndexQuery) -> Result<IndexSeriesOutcome, Error> {
        let PreparedQuery { aoi, window, index } = self.prepare(query)?;
        let name = index.name;
        let request = IndexSeriesRequest { aoi, window, index };

        let result = self.series.sample_index_series(&request).await;
        self.record_outcome("time_series", &result).await;
        let samples = result.map_err(|error| map_engine_error(name, error))?;

        let sampled = samples.len();
        let mut points: Vec<SeriesPoint> = samples
            .into_iter()
            .filter_map(|sample| {
                sample
                    .value
                    .filter(|value| value.is_finite())
                    .map(|value| SeriesPoint {
                        date: sample.date,
                        value,
                    })
            })
            .collect();
        points.sort_by_key(|point| point.date);
        debug!(index = %name, sampled, retained = points.len(), "sampled index series");

        Ok(IndexSeriesOutcome { index: name, points })
    }
}

fn map_engine_error(index: IndexName, error: GeospatialEngineError) -> Error {
    warn!(%index, error = %error, "geospatial engine call failed");
    match error {
        GeospatialEngineError::NoImagery => Error::not_found(NO_IMAGERY_MESSAGE),
        GeospatialEngineError::Rejected { message } => {
            Error::invalid_request(format!("geospatial engine rejected the request: {message}"))
        }
        GeospatialEngineError::Decode { message } => Error::internal(format!(
            "geospatial engine response decode failed: {message}"
        )),
        other @ (GeospatialEngineError::Transport { .. }
        | GeospatialEngineError::Timeout { .. }
        | GeospatialEngineError::RateLimited { .. }
        | GeospatialEngineError::Unauthenticated { .. }) => {
            Error::service_unavailable("geospatial engine unavailable").with_details(json!({
                "reason": other.to_string(),
                "retryable": other.is_retryable(),
            }))
        }
    }
}

#[cfg(test)]
#[path = "vegetation_service_tests.rs"]
mod tests;
