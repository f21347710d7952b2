//! Domain port for recording the outcome of calls to upstream services.
//!
//! Services report each Earth Engine, model or weather archive call once it
//! settles.
//! Implementations may export to Prometheus or discard the events.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording upstream call metrics.
    pub enum UpstreamCallMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "upstream call metrics exporter failed: {message}",
    }
}

/// Upstream service a call was made to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    /// Google Earth Engine REST API.
    EarthEngine,
    /// Gemini generative language API.
    Gemini,
    /// NASA POWER daily weather archive.
    NasaPower,
}

impl Upstream {
    /// Metric label value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EarthEngine => "earth_engine",
            Self::Gemini => "gemini",
            Self::NasaPower => "nasa_power",
        }
    }
}

/// Labels attached to one upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamCallLabels {
    /// Service called.
    pub upstream: Upstream,
    /// Operation name, e.g. `render_map`.
    pub operation: &'static str,
    /// `success` or a failure kind such as `timeout`.
    pub outcome: &'static str,
}

/// Metrics recording port for upstream calls.
#[async_trait]
pub trait UpstreamCallMetrics: Send + Sync {
    /// Record one settled call.
    async fn record_call(&self, labels: &UpstreamCallLabels)
    -> Result<(), UpstreamCallMetricsError>;
}

/// No-op implementation for when metrics are disabled or in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpUpstreamCallMetrics;

#[async_trait]
impl UpstreamCallMetrics for NoOpUpstreamCallMetrics {
    async fn record_call(
        &self,
        _labels: &UpstreamCallLabels,
    ) -> Result<(), UpstreamCallMetricsError> {
        Ok(())
    }
}
