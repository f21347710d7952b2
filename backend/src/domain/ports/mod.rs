//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Adapters for the geospatial engine, the language model, the weather
//! archive and the metrics exporter implement these traits; services depend only on the traits.

mod macros;
pub(crate) use macros::define_port_error;

mod crop_advisor_model;
mod geospatial_engine_error;
mod geospatial_session;
mod upstream_call_metrics;
mod vegetation_map_source;
mod vegetation_series_source;
mod weather_source;

#[cfg(test)]
pub use crop_advisor_model::MockCropAdvisorModel;
pub use crop_advisor_model::{
    CropAdvisorModel, CropAdvisorModelError, FixtureCropAdvisorModel,
    UnconfiguredCropAdvisorModel,
};
pub use geospatial_engine_error::GeospatialEngineError;
#[cfg(test)]
pub use geospatial_session::MockGeospatialSession;
pub use geospatial_session::{FixtureGeospatialSession, GeospatialSession, SessionInfo};
pub use upstream_call_metrics::{
    NoOpUpstreamCallMetrics, Upstream, UpstreamCallLabels, UpstreamCallMetrics,
    UpstreamCallMetricsError,
};
#[cfg(test)]
pub use vegetation_map_source::MockVegetationMapSource;
pub use vegetation_map_source::{
    FixtureVegetationMapSource, IndexMap, IndexMapRequest, VegetationMapSource,
};
#[cfg(test)]
pub use vegetation_series_source::MockVegetationSeriesSource;
pub use vegetation_series_source::{
    FixtureVegetationSeriesSource, IndexSample, IndexSeriesRequest, VegetationSeriesSource,
};
#[cfg(test)]
pub use weather_source::MockWeatherSource;
pub use weather_source::{
    DAILY_WEATHER_PARAMETERS, FixtureWeatherSource, WeatherReport, WeatherRequest, WeatherSource,
    WeatherSourceError,
};
