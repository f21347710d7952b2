//! Reqwest-backed client for the POWER daily point API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{
    DAILY_WEATHER_PARAMETERS, WeatherReport, WeatherRequest, WeatherSource, WeatherSourceError,
};

/// Public daily point endpoint.
pub const DEFAULT_NASA_POWER_URL: &str = "https://power.larc.nasa.gov/api/temporal/daily/point";
const AGRICULTURE_COMMUNITY: &str = "AG";
const PREVIEW_CHAR_LIMIT: usize = 160;

/// POWER endpoint settings.
#[derive(Debug, Clone, PartialEq)]
pub struct NasaPowerConfig {
    /// Daily point endpoint.
    pub endpoint: Url,
    /// User community selecting units, `AG` for agroclimatology.
    pub community: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl NasaPowerConfig {
    /// Defaults for the public endpoint.
    pub fn public() -> Result<Self, url::ParseError> {
        Ok(Self {
            endpoint: Url::parse(DEFAULT_NASA_POWER_URL)?,
            community: AGRICULTURE_COMMUNITY.to_owned(),
            request_timeout: Duration::from_secs(30),
        })
    }
}

/// Failures building the adapter.
#[derive(Debug, thiserror::Error)]
pub enum NasaPowerSetupError {
    /// The HTTP client could not be constructed.
    #[error("failed to build NASA POWER HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Daily point client.
pub struct NasaPowerHttpSource {
    client: Client,
    endpoint: Url,
    community: String,
}

impl NasaPowerHttpSource {
    /// Build a client for `config.endpoint`.
    pub fn new(config: &NasaPowerConfig) -> Result<Self, NasaPowerSetupError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            community: config.community.clone(),
        })
    }

    fn request_url(&self, request: &WeatherRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("parameters", &DAILY_WEATHER_PARAMETERS.join(","))
            .append_pair("community", &self.community)
            .append_pair("longitude", &request.point.lng.to_string())
            .append_pair("latitude", &request.point.lat.to_string())
            .append_pair("start", &request.start.format("%Y%m%d").to_string())
            .append_pair("end", &request.end.format("%Y%m%d").to_string())
            .append_pair("format", "JSON");
        url
    }
}

#[async_trait]
impl WeatherSource for NasaPowerHttpSource {
    async fn fetch_daily_weather(
        &self,
        request: &WeatherRequest,
    ) -> Result<WeatherReport, WeatherSourceError> {
        let response = self
            .client
            .get(self.request_url(request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let payload: Value = serde_json::from_slice(body.as_ref()).map_err(|error| {
            WeatherSourceError::decode(format!("invalid POWER payload: {error}"))
        })?;
        debug!(bytes = body.len(), "received POWER reply");
        Ok(WeatherReport { payload })
    }
}

/// Validation failures come back as `{"messages": [..]}`.
#[derive(Debug, Default, Deserialize)]
struct PowerErrorDto {
    #[serde(default)]
    messages: Vec<String>,
}

fn map_transport_error(error: reqwest::Error) -> WeatherSourceError {
    if error.is_timeout() {
        WeatherSourceError::timeout(error.to_string())
    } else {
        WeatherSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> WeatherSourceError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    match status {
        StatusCode::TOO_MANY_REQUESTS => WeatherSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            WeatherSourceError::timeout(message)
        }
        _ if status.is_client_error() => WeatherSourceError::rejected(message),
        _ => WeatherSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    let text = match serde_json::from_slice::<PowerErrorDto>(body) {
        Ok(dto) if !dto.messages.is_empty() => dto.messages.join("; "),
        _ => String::from_utf8_lossy(body).trim().to_owned(),
    };
    if text.chars().count() <= PREVIEW_CHAR_LIMIT {
        return text;
    }
    let mut preview: String = text.chars().take(PREVIEW_CHAR_LIMIT).collect();
    preview.push_str("...");
    preview
}
