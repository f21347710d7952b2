//! Application wiring shared by the endpoint suites.
//!
//! Mounts the production route table with recording doubles in place of
//! the Earth Engine, Gemini and NASA POWER adapters.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use agriscope_backend::Trace;
use agriscope_backend::domain::ports::{CropAdvisorModelError, GeospatialEngineError};
use agriscope_backend::inbound::http::configure;
use agriscope_backend::inbound::http::health::HealthState;
use agriscope_backend::inbound::http::state::{HttpState, HttpStatePorts};

use super::doubles::{
    FixtureClock, RecordingAdvisorModel, RecordingMapSource, RecordingSeriesSource,
    RecordingWeatherSource, power_reply, tile_map,
};

/// Doubles backing one application instance.
#[derive(Clone)]
pub(crate) struct PortDoubles {
    pub(crate) maps: RecordingMapSource,
    pub(crate) series: RecordingSeriesSource,
    pub(crate) model: RecordingAdvisorModel,
    pub(crate) weather: RecordingWeatherSource,
}

impl Default for PortDoubles {
    fn default() -> Self {
        Self {
            maps: RecordingMapSource::new(Ok(tile_map("projects/agriscope21/maps/ndvi-fixture"))),
            series: RecordingSeriesSource::new(Ok(Vec::new())),
            model: RecordingAdvisorModel::new(Err(CropAdvisorModelError::not_configured())),
            weather: RecordingWeatherSource::new(Ok(power_reply())),
        }
    }
}

impl PortDoubles {
    /// Make both engine doubles fail with `error`.
    pub(crate) fn fail_engine(&self, error: GeospatialEngineError) {
        self.maps.set_reply(Err(error.clone()));
        self.series.set_reply(Err(error));
    }

    pub(crate) fn http_state(&self) -> HttpState {
        HttpState::new(HttpStatePorts {
            maps: Arc::new(self.maps.clone()),
            series: Arc::new(self.series.clone()),
            model: Arc::new(self.model.clone()),
            weather: Arc::new(self.weather.clone()),
            clock: Arc::new(FixtureClock),
        })
    }
}

/// Build the application with the production route table.
pub(crate) fn test_app(
    http_state: web::Data<HttpState>,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(http_state)
        .app_data(health_state)
        .wrap(Trace)
        .configure(configure)
}
