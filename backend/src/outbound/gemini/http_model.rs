//! Reqwest-backed Gemini adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::{ErrorEnvelopeDto, GenerateContentRequestDto, GenerateContentResponseDto};
use crate::domain::ports::{CropAdvisorModel, CropAdvisorModelError};

/// Public Generative Language API endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
/// Model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini endpoint settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    /// API base URL ending in `/`.
    pub base_url: Url,
    /// Model name, e.g. `gemini-1.5-flash`.
    pub model: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl GeminiConfig {
    /// Defaults for the public endpoint.
    pub fn public() -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(DEFAULT_GEMINI_BASE_URL)?,
            model: DEFAULT_GEMINI_MODEL.to_owned(),
            request_timeout: Duration::from_secs(60),
        })
    }
}

/// Gemini `generateContent` client.
pub struct GeminiHttpModel {
    client: Client,
    endpoint: Url,
    api_key: Zeroizing<String>,
}

impl GeminiHttpModel {
    /// Build a client for `config.model`.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint cannot be formed or the reqwest
    /// client cannot be constructed.
    pub fn new(config: &GeminiConfig, api_key: Zeroizing<String>) -> Result<Self, GeminiSetupError> {
        let endpoint = generate_content_url(&config.base_url, &config.model)?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

/// Failures building the adapter.
#[derive(Debug, thiserror::Error)]
pub enum GeminiSetupError {
    /// The model endpoint URL was invalid.
    #[error("invalid Gemini endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    /// The HTTP client could not be constructed.
    #[error("failed to build Gemini HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

fn generate_content_url(base: &Url, model: &str) -> Result<Url, url::ParseError> {
    base.join(&format!("v1beta/models/{model}:generateContent"))
}

#[async_trait]
impl CropAdvisorModel for GeminiHttpModel {
    async fn generate(&self, prompt: &str) -> Result<String, CropAdvisorModelError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&GenerateContentRequestDto::from_prompt(prompt))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let decoded: GenerateContentResponseDto =
            serde_json::from_slice(body.as_ref()).map_err(|error| {
                CropAdvisorModelError::decode(format!("invalid Gemini payload: {error}"))
            })?;
        let text = decoded.into_text().map_err(CropAdvisorModelError::decode)?;
        debug!(chars = text.len(), "received Gemini reply");
        Ok(text)
    }
}

fn map_transport_error(error: reqwest::Error) -> CropAdvisorModelError {
    if error.is_timeout() {
        CropAdvisorModelError::timeout(error.to_string())
    } else {
        CropAdvisorModelError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> CropAdvisorModelError {
    let detail = serde_json::from_slice::<ErrorEnvelopeDto>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_default();
    let message = if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {detail}", status.as_u16())
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            CropAdvisorModelError::unauthenticated(message)
        }
        StatusCode::TOO_MANY_REQUESTS => CropAdvisorModelError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            CropAdvisorModelError::timeout(message)
        }
        // Invalid keys come back as 400 API_KEY_INVALID.
        StatusCode::BAD_REQUEST if detail.contains("API key") => {
            CropAdvisorModelError::unauthenticated(message)
        }
        _ if status.is_client_error() => CropAdvisorModelError::rejected(message),
        _ => CropAdvisorModelError::transport(message),
    }
}
