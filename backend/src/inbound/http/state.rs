//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    CropAdvisorModel, FixtureCropAdvisorModel, FixtureVegetationMapSource,
    FixtureVegetationSeriesSource, FixtureWeatherSource, UpstreamCallMetrics,
    VegetationMapSource, VegetationSeriesSource, WeatherSource,
};
use crate::domain::{CropRecommendationService, VegetationIndexService, WeatherService};
use crate::inbound::http::debug::ServiceSummary;

/// Parameter object bundling the driven ports used by HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub maps: Arc<dyn VegetationMapSource>,
    pub series: Arc<dyn VegetationSeriesSource>,
    pub model: Arc<dyn CropAdvisorModel>,
    pub weather: Arc<dyn WeatherSource>,
    pub clock: Arc<dyn Clock>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            maps: Arc::new(FixtureVegetationMapSource),
            series: Arc::new(FixtureVegetationSeriesSource),
            model: Arc::new(FixtureCropAdvisorModel),
            weather: Arc::new(FixtureWeatherSource),
            clock: Arc::new(DefaultClock),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub vegetation: VegetationIndexService,
    pub crop_advice: CropRecommendationService,
    pub weather: WeatherService,
    pub summary: Arc<ServiceSummary>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use agriscope_backend::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::default());
    /// assert_eq!(state.summary.gemini.model, "fixture");
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            maps,
            series,
            model,
            weather,
            clock,
        } = ports;
        Self {
            vegetation: VegetationIndexService::new(maps, series, clock.clone()),
            crop_advice: CropRecommendationService::new(model, clock),
            weather: WeatherService::new(weather),
            summary: Arc::new(ServiceSummary::fixture()),
        }
    }

    /// Override the archive latency used to reject too-recent windows.
    #[must_use]
    pub fn with_latency_days(mut self, latency_days: u32) -> Self {
        self.vegetation = self.vegetation.with_latency_days(latency_days);
        self
    }

    /// Record upstream call outcomes with `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn UpstreamCallMetrics>) -> Self {
        self.vegetation = self.vegetation.with_metrics(metrics.clone());
        self.crop_advice = self.crop_advice.with_metrics(metrics.clone());
        self.weather = self.weather.with_metrics(metrics);
        self
    }

    /// Replace the configuration summary reported by the debug endpoint.
    #[must_use]
    pub fn with_summary(mut self, summary: ServiceSummary) -> Self {
        self.summary = Arc::new(summary);
        self
    }
}
