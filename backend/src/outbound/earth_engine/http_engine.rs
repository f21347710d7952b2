//! Reqwest-backed Earth Engine adapter.
//!
//! One client implements every geospatial port: it owns token handling,
//! expression building, HTTP error mapping, and response decoding.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::auth::{EarthEngineCredentials, TokenProvider};
use super::dto::{
    ComputeValueRequestDto, ComputeValueResponseDto, CreateMapRequestDto, CreateMapResponseDto,
    ErrorEnvelopeDto, FeatureCollectionDto,
};
use super::expression::{Expression, GraphBuilder};
use crate::domain::ports::{
    GeospatialEngineError, GeospatialSession, IndexMap, IndexMapRequest, IndexSample,
    IndexSeriesRequest, SessionInfo, VegetationMapSource, VegetationSeriesSource,
};
use crate::domain::{AreaOfInterest, ObservationWindow};

/// Sentinel-2 level-2A surface reflectance.
pub const DEFAULT_COLLECTION: &str = "COPERNICUS/S2_SR";
/// Public REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://earthengine.googleapis.com/";
const DEFAULT_CLOUD_THRESHOLD: f64 = 20.0;
const DEFAULT_SERIES_BUFFER_M: f64 = -20.0;
const DEFAULT_SERIES_SCALE_M: f64 = 10.0;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Engine endpoint and query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthEngineConfig {
    /// REST base URL ending in `/`.
    pub api_base: Url,
    /// Cloud project billed for computations.
    pub project: String,
    /// Image collection identifier.
    pub collection: String,
    /// Scenes at or above this cloudy-pixel percentage are skipped.
    pub cloud_threshold: f64,
    /// Buffer applied to the field before sampling; negative shrinks it away
    /// from mixed edge pixels.
    pub series_buffer_m: f64,
    /// Sampling resolution in metres.
    pub series_scale_m: f64,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl EarthEngineConfig {
    /// Defaults for `project` against the public endpoint.
    pub fn for_project(project: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            api_base: Url::parse(DEFAULT_API_BASE)?,
            project: project.into(),
            collection: DEFAULT_COLLECTION.to_owned(),
            cloud_threshold: DEFAULT_CLOUD_THRESHOLD,
            series_buffer_m: DEFAULT_SERIES_BUFFER_M,
            series_scale_m: DEFAULT_SERIES_SCALE_M,
            request_timeout: DEFAULT_TIMEOUT,
        })
    }
}

/// Earth Engine REST client implementing the geospatial ports.
pub struct EarthEngineHttpClient {
    client: Client,
    config: EarthEngineConfig,
    tokens: TokenProvider,
}

impl EarthEngineHttpClient {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        config: EarthEngineConfig,
        credentials: EarthEngineCredentials,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        let tokens = TokenProvider::new(client.clone(), credentials, clock);
        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &EarthEngineConfig {
        &self.config
    }

    fn project_url(&self, suffix: &str) -> Result<Url, GeospatialEngineError> {
        self.config
            .api_base
            .join(&format!("v1/projects/{}/{suffix}", self.config.project))
            .map_err(|error| GeospatialEngineError::rejected(format!("invalid endpoint: {error}")))
    }

    async fn post<B, T>(&self, suffix: &str, body: &B) -> Result<T, GeospatialEngineError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.project_url(suffix)?;
        let (token, _) = self.tokens.bearer().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                self.tokens.invalidate().await;
            }
            return Err(map_status_error(status, bytes.as_ref()));
        }

        serde_json::from_slice(bytes.as_ref()).map_err(|error| {
            GeospatialEngineError::decode(format!("invalid Earth Engine payload for {suffix}: {error}"))
        })
    }

    async fn compute(&self, expression: &Expression) -> Result<Value, GeospatialEngineError> {
        let response: ComputeValueResponseDto = self
            .post("value:compute", &ComputeValueRequestDto { expression })
            .await?;
        Ok(response.result)
    }

    async fn ensure_imagery(
        &self,
        aoi: &AreaOfInterest,
        window: &ObservationWindow,
        buffer_m: Option<f64>,
    ) -> Result<(), GeospatialEngineError> {
        let mut graph = GraphBuilder::new();
        let mut geometry = graph.polygon(aoi);
        if let Some(metres) = buffer_m {
            geometry = graph.buffer(geometry, metres);
        }
        let collection = graph.filtered_collection(
            &self.config.collection,
            geometry,
            window,
            self.config.cloud_threshold,
        );
        let size = graph.size(collection);
        let count = self.compute(&graph.finish(size)).await?;
        debug!(scenes = %count, "counted collection size");
        match count.as_u64() {
            Some(0) => Err(GeospatialEngineError::no_imagery()),
            Some(_) => Ok(()),
            None => Err(GeospatialEngineError::decode(format!(
                "collection size was not an integer: {count}"
            ))),
        }
    }
}

fn tile_url(api_base: &Url, map_name: &str) -> String {
    let base = api_base.as_str().trim_end_matches('/');
    format!("{base}/v1/{map_name}/tiles/{{z}}/{{x}}/{{y}}")
}

#[async_trait]
impl VegetationMapSource for EarthEngineHttpClient {
    async fn render_index_map(
        &self,
        request: &IndexMapRequest,
    ) -> Result<IndexMap, GeospatialEngineError> {
        self.ensure_imagery(&request.aoi, &request.window, None).await?;

        let mut graph = GraphBuilder::new();
        let polygon = graph.polygon(&request.aoi);
        let collection = graph.filtered_collection(
            &self.config.collection,
            polygon.clone(),
            &request.window,
            self.config.cloud_threshold,
        );
        let indexed = graph.index_collection(collection, &request.index);
        let image = graph.clipped_mean(indexed, polygon);
        let expression = graph.finish(image);

        let response: CreateMapResponseDto = self
            .post(
                "maps",
                &CreateMapRequestDto::new(&expression, &request.index.visualization),
            )
            .await?;
        Ok(IndexMap {
            tile_url: tile_url(&self.config.api_base, &response.name),
            map_id: response.name,
        })
    }
}

#[async_trait]
impl VegetationSeriesSource for EarthEngineHttpClient {
    async fn sample_index_series(
        &self,
        request: &IndexSeriesRequest,
    ) -> Result<Vec<IndexSample>, GeospatialEngineError> {
        let buffer_m = self.config.series_buffer_m;
        self.ensure_imagery(&request.aoi, &request.window, Some(buffer_m))
            .await?;

        let mut graph = GraphBuilder::new();
        let polygon = graph.polygon(&request.aoi);
        let sampled_area = graph.buffer(polygon, buffer_m);
        let collection = graph.filtered_collection(
            &self.config.collection,
            sampled_area.clone(),
            &request.window,
            self.config.cloud_threshold,
        );
        let indexed = graph.index_collection(collection, &request.index);
        let features = graph.regional_means(
            indexed,
            sampled_area,
            request.index.name.code(),
            self.config.series_scale_m,
        );

        let result = self.compute(&graph.finish(features)).await?;
        let decoded: FeatureCollectionDto = serde_json::from_value(result).map_err(|error| {
            GeospatialEngineError::decode(format!("invalid feature collection: {error}"))
        })?;
        Ok(decoded.into_samples())
    }
}

#[async_trait]
impl GeospatialSession for EarthEngineHttpClient {
    async fn authenticate(&self) -> Result<SessionInfo, GeospatialEngineError> {
        let (_, expires_at) = self.tokens.bearer().await?;
        let echo = Expression {
            result: "0".to_owned(),
            values: Map::from_iter([("0".to_owned(), json!({ "constantValue": 1 }))]),
        };
        let echoed = self.compute(&echo).await?;
        if echoed.as_i64() != Some(1) {
            return Err(GeospatialEngineError::decode(format!(
                "unexpected echo result: {echoed}"
            )));
        }
        Ok(SessionInfo {
            project: self.config.project.clone(),
            expires_at,
        })
    }
}

pub(super) fn map_transport_error(error: reqwest::Error) -> GeospatialEngineError {
    if error.is_timeout() {
        GeospatialEngineError::timeout(error.to_string())
    } else {
        GeospatialEngineError::transport(error.to_string())
    }
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> GeospatialEngineError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GeospatialEngineError::unauthenticated(message)
        }
        StatusCode::TOO_MANY_REQUESTS => GeospatialEngineError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GeospatialEngineError::timeout(message)
        }
        _ if status.is_client_error() => GeospatialEngineError::rejected(message),
        _ => GeospatialEngineError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 240;

    let text = match serde_json::from_slice::<ErrorEnvelopeDto>(body) {
        Ok(envelope) => {
            let message = envelope.error.message;
            match envelope.error.status {
                Some(status) if !message.is_empty() => format!("{status}: {message}"),
                Some(status) => status,
                None => message,
            }
        }
        Err(_) => String::from_utf8_lossy(body)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "),
    };

    if text.chars().count() <= PREVIEW_CHAR_LIMIT {
        return text;
    }
    let mut preview: String = text.chars().take(PREVIEW_CHAR_LIMIT).collect();
    preview.push_str("...");
    preview
}
