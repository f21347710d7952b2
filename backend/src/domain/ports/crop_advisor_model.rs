//! Driven port for the generative language model.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling the language model.
    pub enum CropAdvisorModelError {
        /// No model credentials are configured.
        NotConfigured =>
            "language model is not configured",
        /// Network transport failed or the model answered with a 5xx.
        Transport { message: String } =>
            "language model transport failed: {message}",
        /// The model did not answer in time.
        Timeout { message: String } =>
            "language model timeout: {message}",
        /// The model throttled the request.
        RateLimited { message: String } =>
            "language model rate limited request: {message}",
        /// The API key was refused.
        Unauthenticated { message: String } =>
            "language model authentication failed: {message}",
        /// The request was rejected.
        Rejected { message: String } =>
            "language model rejected request: {message}",
        /// The reply carried no usable text.
        Decode { message: String } =>
            "language model response decode failed: {message}",
    }
    retryable = [Transport, Timeout, RateLimited];
}

impl CropAdvisorModelError {
    /// Short failure kind used as a metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::RateLimited { .. } => "rate_limited",
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Rejected { .. } => "rejected",
            Self::Decode { .. } => "decode",
        }
    }
}

/// Port for generating free text from a prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CropAdvisorModel: Send + Sync {
    /// Generate a reply to `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, CropAdvisorModelError>;
}

/// Model used when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredCropAdvisorModel;

#[async_trait]
impl CropAdvisorModel for UnconfiguredCropAdvisorModel {
    async fn generate(&self, _prompt: &str) -> Result<String, CropAdvisorModelError> {
        Err(CropAdvisorModelError::not_configured())
    }
}

/// Fixture implementation replying with a small JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCropAdvisorModel;

#[async_trait]
impl CropAdvisorModel for FixtureCropAdvisorModel {
    async fn generate(&self, _prompt: &str) -> Result<String, CropAdvisorModelError> {
        Ok(r#"{"primary_crop": {"name": "Mustard", "suitability_score": 90}}"#.to_owned())
    }
}
