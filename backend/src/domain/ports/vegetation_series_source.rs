//! Driven port for sampling an index over time.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::GeospatialEngineError;
use crate::domain::{AreaOfInterest, IndexDefinition, ObservationWindow};

/// Per-scene sampling request.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSeriesRequest {
    /// Field polygon.
    pub aoi: AreaOfInterest,
    /// Imagery acquisition window.
    pub window: ObservationWindow,
    /// Index formula.
    pub index: IndexDefinition,
}

/// Mean index value over the field for one acquisition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSample {
    /// Acquisition day.
    pub date: NaiveDate,
    /// Mean value; `None` when every pixel was masked.
    pub value: Option<f64>,
}

/// Port for sampling index time series.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VegetationSeriesSource: Send + Sync {
    /// Sample one value per scene in the window, in engine order.
    async fn sample_index_series(
        &self,
        request: &IndexSeriesRequest,
    ) -> Result<Vec<IndexSample>, GeospatialEngineError>;
}

/// Fixture implementation returning no samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureVegetationSeriesSource;

#[async_trait]
impl VegetationSeriesSource for FixtureVegetationSeriesSource {
    async fn sample_index_series(
        &self,
        _request: &IndexSeriesRequest,
    ) -> Result<Vec<IndexSample>, GeospatialEngineError> {
        Ok(Vec::new())
    }
}
