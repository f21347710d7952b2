//! Prometheus adapter for upstream call metrics.
//!
//! Outcomes are registered with the registry shared with the HTTP metrics
//! middleware so both are exposed via the `/metrics` endpoint.

use async_trait::async_trait;
use prometheus::{CounterVec, Opts, Registry};

use crate::domain::ports::{UpstreamCallLabels, UpstreamCallMetrics, UpstreamCallMetricsError};

/// Prometheus-backed upstream call recorder.
///
/// # Metrics
///
/// - **Name**: `agriscope_upstream_calls_total`
/// - **Type**: Counter
/// - **Labels**:
///   - `upstream`: `earth_engine` or `gemini`
///   - `operation`: `render_map`, `time_series` or `generate`
///   - `outcome`: `success` or the failure kind
pub struct PrometheusUpstreamCallMetrics {
    calls_total: CounterVec,
}

impl PrometheusUpstreamCallMetrics {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let calls_total = CounterVec::new(
            Opts::new(
                "agriscope_upstream_calls_total",
                "Total upstream calls by service, operation and outcome",
            ),
            &["upstream", "operation", "outcome"],
        )?;
        registry.register(Box::new(calls_total.clone()))?;
        Ok(Self { calls_total })
    }
}

#[async_trait]
impl UpstreamCallMetrics for PrometheusUpstreamCallMetrics {
    async fn record_call(
        &self,
        labels: &UpstreamCallLabels,
    ) -> Result<(), UpstreamCallMetricsError> {
        self.calls_total
            .get_metric_with_label_values(&[
                labels.upstream.as_str(),
                labels.operation,
                labels.outcome,
            ])
            .map_err(|error| UpstreamCallMetricsError::export(error.to_string()))?
            .inc();
        Ok(())
    }
}
