//! Driven port for daily agro-meteorological observations.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};

use super::define_port_error;
use crate::domain::LngLat;

/// Daily parameters requested for each field point.
///
/// Mean, maximum and minimum air temperature at 2 m, corrected
/// precipitation, relative humidity at 2 m and surface shortwave irradiance.
pub const DAILY_WEATHER_PARAMETERS: [&str; 6] = [
    "T2M",
    "T2M_MAX",
    "T2M_MIN",
    "PRECTOTCORR",
    "RH2M",
    "ALLSKY_SFC_SW_DWN",
];

define_port_error! {
    /// Errors surfaced while fetching weather observations.
    pub enum WeatherSourceError {
        /// Network transport failed or the archive answered with a 5xx.
        Transport { message: String } =>
            "weather archive transport failed: {message}",
        /// The archive did not answer in time.
        Timeout { message: String } =>
            "weather archive timeout: {message}",
        /// The archive throttled the request.
        RateLimited { message: String } =>
            "weather archive rate limited request: {message}",
        /// The archive refused the point or date range.
        Rejected { message: String } =>
            "weather archive rejected request: {message}",
        /// The reply was not JSON.
        Decode { message: String } =>
            "weather archive response decode failed: {message}",
    }
    retryable = [Transport, Timeout, RateLimited];
}

impl WeatherSourceError {
    /// Short failure kind used as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::RateLimited { .. } => "rate_limited",
            Self::Rejected { .. } => "rejected",
            Self::Decode { .. } => "decode",
        }
    }
}

/// Point and inclusive date range to fetch daily observations for.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRequest {
    /// Field point, usually the polygon centroid.
    pub point: LngLat,
    /// First day, inclusive.
    pub start: NaiveDate,
    /// Last day, inclusive.
    pub end: NaiveDate,
}

/// Archive reply, passed through to callers unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Decoded JSON document.
    pub payload: Value,
}

/// Port for fetching daily weather at a point.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch [`DAILY_WEATHER_PARAMETERS`] for every day in the request.
    async fn fetch_daily_weather(
        &self,
        request: &WeatherRequest,
    ) -> Result<WeatherReport, WeatherSourceError>;
}

/// Fixture implementation answering with one day of constant readings.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureWeatherSource;

#[async_trait]
impl WeatherSource for FixtureWeatherSource {
    async fn fetch_daily_weather(
        &self,
        request: &WeatherRequest,
    ) -> Result<WeatherReport, WeatherSourceError> {
        let day = request.start.format("%Y%m%d").to_string();
        Ok(WeatherReport {
            payload: json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [request.point.lng, request.point.lat],
                },
                "properties": {
                    "parameter": {
                        "T2M": { day.as_str(): 24.1 },
                        "T2M_MAX": { day.as_str(): 30.2 },
                        "T2M_MIN": { day.as_str(): 18.4 },
                        "PRECTOTCORR": { day.as_str(): 1.3 },
                        "RH2M": { day.as_str(): 61.0 },
                        "ALLSKY_SFC_SW_DWN": { day.as_str(): 21.7 },
                    }
                },
            }),
        })
    }
}
