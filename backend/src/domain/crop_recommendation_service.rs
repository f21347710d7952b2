//! AI crop recommendation use-case.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use mockable::Clock;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::Error;
use super::crop_advice::{
    CropAdviceRequest, build_prompt, fallback_recommendations, parse_model_reply,
};
use super::ports::{
    CropAdvisorModel, CropAdvisorModelError, NoOpUpstreamCallMetrics, Upstream,
    UpstreamCallLabels, UpstreamCallMetrics,
};

/// Successful recommendation envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropRecommendation {
    /// Always `success`.
    pub status: &'static str,
    /// Always `true`; fallback advice is only carried in error details.
    pub ai_generated: bool,
    /// Parsed model reply.
    pub recommendations: Value,
    /// Generation time, RFC 3339.
    pub generated_at: String,
    /// Location echoed from the request.
    pub field_location: String,
}

/// Service turning field descriptions into model-backed advice.
#[derive(Clone)]
pub struct CropRecommendationService {
    model: Arc<dyn CropAdvisorModel>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn UpstreamCallMetrics>,
}

impl CropRecommendationService {
    /// Create a service over the given model port.
    pub fn new(model: Arc<dyn CropAdvisorModel>, clock: Arc<dyn Clock>) -> Self {
        Self {
            model,
            clock,
            metrics: Arc::new(NoOpUpstreamCallMetrics),
        }
    }

    /// Record model call outcomes with `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn UpstreamCallMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Generate recommendations for one field.
    ///
    /// When the model is not configured the error details carry static
    /// fallback advice under `recommendations` with `fallback: true`.
    pub async fn recommend(&self, request: CropAdviceRequest) -> Result<CropRecommendation, Error> {
        let now = self.clock.utc();
        let prompt = build_prompt(
            &request.field,
            request.weather.as_ref(),
            request.vegetation.as_ref(),
            now,
        );

        let result = self.model.generate(&prompt).await;
        let labels = UpstreamCallLabels {
            upstream: Upstream::Gemini,
            operation: "generate",
            outcome: result.as_ref().map_or_else(CropAdvisorModelError::kind, |_| "success"),
        };
        if let Err(error) = self.metrics.record_call(&labels).await {
            debug!(error = %error, "failed to record model call metric");
        }
        let reply = result.map_err(map_model_error)?;
        info!(
            location = request.field.reported_location(),
            reply_chars = reply.len(),
            "generated crop recommendations"
        );

        Ok(CropRecommendation {
            status: "success",
            ai_generated: true,
            recommendations: parse_model_reply(&reply),
            generated_at: timestamp(now),
            field_location: request.field.reported_location().to_owned(),
        })
    }
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn map_model_error(error: CropAdvisorModelError) -> Error {
    match error {
        CropAdvisorModelError::NotConfigured => {
            Error::service_unavailable("AI service not available. Configure a Gemini API key.")
                .with_details(json!({
                    "fallback": true,
                    "recommendations": fallback_recommendations(),
                }))
        }
        other => {
            warn!(error = %other, "crop advisor model call failed");
            Error::service_unavailable(format!("AI recommendation failed: {other}")).with_details(
                json!({
                    "fallback": true,
                    "retryable": other.is_retryable(),
                }),
            )
        }
    }
}
