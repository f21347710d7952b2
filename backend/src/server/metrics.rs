//! Optional Prometheus metrics middleware wrapper.
//!
//! Wrapping with [`MetricsLayer::Disabled`] keeps the app's body type boxed
//! either way, so the factory has one concrete type regardless of whether a
//! registry was configured.

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use futures_util::future::LocalBoxFuture;
use std::sync::Arc;

/// Namespace prefixed to HTTP request metrics.
pub(crate) const METRICS_NAMESPACE: &str = "agriscope";
/// Path serving the Prometheus text exposition.
pub(crate) const METRICS_ENDPOINT: &str = "/metrics";

/// Build the HTTP metrics middleware and its registry.
///
/// # Errors
/// Returns [`std::io::Error`] when the default collectors cannot be
/// registered.
pub(crate) fn make_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new(METRICS_NAMESPACE)
        .endpoint(METRICS_ENDPOINT)
        .build()
        .map_err(|e| std::io::Error::other(format!("configure Prometheus metrics: {e}")))
}

#[derive(Clone)]
pub(crate) enum MetricsLayer {
    Enabled(Arc<PrometheusMetrics>),
    Disabled,
}

impl MetricsLayer {
    #[must_use]
    pub(crate) fn from_option(metrics: Option<PrometheusMetrics>) -> Self {
        metrics.map_or(Self::Disabled, |metrics| Self::Enabled(Arc::new(metrics)))
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        match self.clone() {
            MetricsLayer::Enabled(metrics) => {
                let fut = Compat::new((*metrics).clone()).new_transform(service);
                Box::pin(async move {
                    let svc = fut.await?;
                    Ok(boxed::service(svc))
                })
            }
            MetricsLayer::Disabled => Box::pin(async move {
                let svc = service.map(|res: ServiceResponse<B>| res.map_into_boxed_body());
                Ok(boxed::service(svc))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    #[rstest]
    #[actix_web::test]
    async fn enabled_layer_serves_request_counters() {
        let layer = MetricsLayer::from_option(Some(make_metrics().expect("metrics build")));
        let app = test::init_service(
            App::new()
                .wrap(layer)
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let ping = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        assert_eq!(ping.status(), StatusCode::OK);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(METRICS_ENDPOINT).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("agriscope_http_requests_total"), "{text}");
    }

    #[rstest]
    #[actix_web::test]
    async fn disabled_layer_leaves_metrics_path_unrouted() {
        let app = test::init_service(
            App::new()
                .wrap(MetricsLayer::from_option(None))
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let ping = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        assert_eq!(ping.status(), StatusCode::OK);

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(METRICS_ENDPOINT).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
