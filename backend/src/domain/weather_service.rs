//! Daily weather use-case for a field polygon.
//!
//! The archive is queried at the polygon centroid and its reply is returned
//! unchanged so clients can chart any of the requested parameters.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use super::ports::{
    NoOpUpstreamCallMetrics, Upstream, UpstreamCallLabels, UpstreamCallMetrics, WeatherReport,
    WeatherRequest, WeatherSource, WeatherSourceError,
};
use super::{AreaOfInterest, Error, ObservationWindow};

/// Message returned when the archive cannot be reached.
pub const WEATHER_UNAVAILABLE_MESSAGE: &str = "Failed to fetch weather data";

/// Unvalidated weather request as received from a caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeatherQuery {
    /// Polygon as `[lng, lat]` pairs.
    pub coordinates: Vec<Vec<f64>>,
    /// First day, `YYYY-MM-DD`.
    pub start_date: String,
    /// Last day, `YYYY-MM-DD`, inclusive.
    pub end_date: String,
}

/// Service fetching daily weather through the [`WeatherSource`] port.
#[derive(Clone)]
pub struct WeatherService {
    source: Arc<dyn WeatherSource>,
    metrics: Arc<dyn UpstreamCallMetrics>,
}

impl WeatherService {
    /// Create a service over the given archive port.
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self {
            source,
            metrics: Arc::new(NoOpUpstreamCallMetrics),
        }
    }

    /// Record archive call outcomes with `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn UpstreamCallMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Fetch daily observations at the centroid of the query polygon.
    pub async fn daily_weather(&self, query: WeatherQuery) -> Result<WeatherReport, Error> {
        let aoi = AreaOfInterest::try_from_coordinates(query.coordinates)?;
        let window = ObservationWindow::parse_ordered(&query.start_date, &query.end_date)?;
        let request = WeatherRequest {
            point: aoi.centroid(),
            start: window.start(),
            end: window.end(),
        };

        let result = self.source.fetch_daily_weather(&request).await;
        let labels = UpstreamCallLabels {
            upstream: Upstream::NasaPower,
            operation: "daily_weather",
            outcome: result.as_ref().map_or_else(WeatherSourceError::kind, |_| "success"),
        };
        if let Err(error) = self.metrics.record_call(&labels).await {
            debug!(error = %error, "failed to record weather call metric");
        }
        let report = result.map_err(map_weather_error)?;
        debug!(
            lng = request.point.lng,
            lat = request.point.lat,
            start = %request.start,
            end = %request.end,
            "fetched daily weather"
        );
        Ok(report)
    }
}

fn map_weather_error(error: WeatherSourceError) -> Error {
    warn!(error = %error, "weather archive call failed");
    match error {
        WeatherSourceError::Rejected { message } => {
            Error::invalid_request(format!("weather archive rejected the request: {message}"))
        }
        WeatherSourceError::Decode { message } => Error::internal(format!(
            "weather archive response decode failed: {message}"
        )),
        other @ (WeatherSourceError::Transport { .. }
        | WeatherSourceError::Timeout { .. }
        | WeatherSourceError::RateLimited { .. }) => {
            Error::service_unavailable(WEATHER_UNAVAILABLE_MESSAGE).with_details(json!({
                "reason": other.to_string(),
                "retryable": other.is_retryable(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};
    use serde_json::json;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockWeatherSource, UpstreamCallMetricsError};

    #[derive(Default)]
    struct RecordedCalls(Mutex<Vec<UpstreamCallLabels>>);

    #[async_trait]
    impl UpstreamCallMetrics for RecordedCalls {
        async fn record_call(
            &self,
            labels: &UpstreamCallLabels,
        ) -> Result<(), UpstreamCallMetricsError> {
            self.0
                .lock()
                .expect("metrics lock is not poisoned")
                .push(labels.clone());
            Ok(())
        }
    }

    #[fixture]
    fn query() -> WeatherQuery {
        WeatherQuery {
            coordinates: vec![
                vec![73.0, 19.0],
                vec![74.0, 19.0],
                vec![74.0, 20.0],
                vec![73.0, 20.0],
                vec![73.0, 19.0],
            ],
            start_date: "2025-07-01".to_owned(),
            end_date: "2025-07-07".to_owned(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn queries_the_centroid_and_passes_the_reply_through(query: WeatherQuery) {
        let mut source = MockWeatherSource::new();
        source
            .expect_fetch_daily_weather()
            .withf(|request| {
                request.point.lng == 73.5
                    && request.point.lat == 19.5
                    && request.start == NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date")
                    && request.end == NaiveDate::from_ymd_opt(2025, 7, 7).expect("valid date")
            })
            .times(1)
            .return_once(|_| {
                Ok(WeatherReport {
                    payload: json!({"properties": {"parameter": {"T2M": {"20250701": 27.5}}}}),
                })
            });
        let metrics = Arc::new(RecordedCalls::default());

        let report = WeatherService::new(Arc::new(source))
            .with_metrics(metrics.clone())
            .daily_weather(query)
            .await
            .expect("weather fetched");

        assert_eq!(report.payload["properties"]["parameter"]["T2M"]["20250701"], 27.5);
        let calls = metrics.0.lock().expect("metrics lock is not poisoned");
        assert_eq!(
            calls.as_slice(),
            [UpstreamCallLabels {
                upstream: Upstream::NasaPower,
                operation: "daily_weather",
                outcome: "success",
            }]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_polygons_never_reach_the_archive(mut query: WeatherQuery) {
        query.coordinates.truncate(2);
        let mut source = MockWeatherSource::new();
        source.expect_fetch_daily_weather().never();

        let error = WeatherService::new(Arc::new(source))
            .daily_weather(query)
            .await
            .expect_err("two vertices are rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn reversed_dates_are_rejected(mut query: WeatherQuery) {
        query.start_date = "2025-07-08".to_owned();
        let mut source = MockWeatherSource::new();
        source.expect_fetch_daily_weather().never();

        let error = WeatherService::new(Arc::new(source))
            .daily_weather(query)
            .await
            .expect_err("start after end");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case(WeatherSourceError::timeout("30s"), ErrorCode::ServiceUnavailable, "timeout")]
    #[case(WeatherSourceError::transport("reset"), ErrorCode::ServiceUnavailable, "transport")]
    #[case(WeatherSourceError::rejected("bad range"), ErrorCode::InvalidRequest, "rejected")]
    #[case(WeatherSourceError::decode("html page"), ErrorCode::InternalError, "decode")]
    #[tokio::test]
    async fn archive_failures_map_to_api_errors(
        query: WeatherQuery,
        #[case] failure: WeatherSourceError,
        #[case] code: ErrorCode,
        #[case] outcome: &'static str,
    ) {
        let mut source = MockWeatherSource::new();
        source
            .expect_fetch_daily_weather()
            .return_once(move |_| Err(failure));
        let metrics = Arc::new(RecordedCalls::default());

        let error = WeatherService::new(Arc::new(source))
            .with_metrics(metrics.clone())
            .daily_weather(query)
            .await
            .expect_err("archive failed");

        assert_eq!(error.code(), code);
        if code == ErrorCode::ServiceUnavailable {
            assert_eq!(error.message(), WEATHER_UNAVAILABLE_MESSAGE);
            assert_eq!(
                error.details().map(|details| details["retryable"].clone()),
                Some(json!(true))
            );
        }
        let calls = metrics.0.lock().expect("metrics lock is not poisoned");
        assert_eq!(calls.first().map(|labels| labels.outcome), Some(outcome));
    }
}
