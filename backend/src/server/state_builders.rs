//! Builders wiring settings into outbound adapters and HTTP state.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use agriscope_backend::domain::ports::{
    CropAdvisorModel, GeospatialSession, UnconfiguredCropAdvisorModel,
};
use agriscope_backend::inbound::http::debug::{
    EngineSummary, ModelSummary, ServiceSummary, secret_fingerprint,
};
use agriscope_backend::inbound::http::state::{HttpState, HttpStatePorts};
use agriscope_backend::outbound::earth_engine::{EarthEngineCredentials, EarthEngineHttpClient};
use agriscope_backend::outbound::gemini::{GeminiConfig, GeminiHttpModel};
#[cfg(feature = "metrics")]
use agriscope_backend::outbound::metrics::PrometheusUpstreamCallMetrics;
use agriscope_backend::outbound::nasa_power::NasaPowerHttpSource;
use agriscope_backend::settings::AppSettings;

use super::ServerConfig;

/// Adapters and state assembled at startup.
pub(crate) struct ServerState {
    /// State shared with HTTP handlers.
    pub(crate) http_state: HttpState,
    /// Session checked before the server reports ready.
    pub(crate) session: Arc<dyn GeospatialSession>,
}

/// Credential kind and fingerprint, safe to expose on the debug endpoint.
fn describe_credentials(credentials: &EarthEngineCredentials) -> (String, String) {
    match credentials {
        EarthEngineCredentials::ServiceAccount(key) => (
            "service_account".to_owned(),
            secret_fingerprint(key.private_key_pem()),
        ),
        EarthEngineCredentials::AccessToken(token) => {
            ("access_token".to_owned(), secret_fingerprint(token))
        }
    }
}

fn build_model(
    settings: &AppSettings,
    gemini: &GeminiConfig,
) -> std::io::Result<(Arc<dyn CropAdvisorModel>, ModelSummary)> {
    let Some(api_key) = settings.gemini_api_key() else {
        warn!("no Gemini API key configured; crop recommendations will use fallback advice");
        return Ok((
            Arc::new(UnconfiguredCropAdvisorModel),
            ModelSummary {
                configured: false,
                model: gemini.model.clone(),
                api_key_fingerprint: None,
            },
        ));
    };
    let fingerprint = secret_fingerprint(&api_key);
    let model = GeminiHttpModel::new(gemini, api_key)
        .map_err(|e| std::io::Error::other(format!("Gemini client setup failed: {e}")))?;
    Ok((
        Arc::new(model),
        ModelSummary {
            configured: true,
            model: gemini.model.clone(),
            api_key_fingerprint: Some(fingerprint),
        },
    ))
}

#[cfg(feature = "metrics")]
fn attach_metrics(state: HttpState, config: &ServerConfig) -> std::io::Result<HttpState> {
    match config.metrics() {
        Some(prom) => {
            let metrics = PrometheusUpstreamCallMetrics::new(&prom.registry).map_err(|e| {
                std::io::Error::other(format!("upstream metrics registration failed: {e}"))
            })?;
            Ok(state.with_metrics(Arc::new(metrics)))
        }
        None => Ok(state),
    }
}

#[cfg(not(feature = "metrics"))]
fn attach_metrics(state: HttpState, _config: &ServerConfig) -> std::io::Result<HttpState> {
    Ok(state)
}

/// Build the Earth Engine, Gemini and NASA POWER adapters described by
/// `settings`.
///
/// # Errors
/// Returns [`std::io::Error`] when settings are invalid, credentials cannot be
/// loaded, or an HTTP client cannot be constructed.
pub(crate) fn build_server_state(
    settings: &AppSettings,
    config: &ServerConfig,
) -> std::io::Result<ServerState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let engine_config = settings.earth_engine().map_err(std::io::Error::other)?;
    let credentials = settings
        .earth_engine_credentials()
        .map_err(std::io::Error::other)?;
    let (credential_kind, fingerprint) = describe_credentials(&credentials);
    let engine_summary = EngineSummary {
        project: engine_config.project.clone(),
        collection: engine_config.collection.clone(),
        api_base: engine_config.api_base.to_string(),
        credentials: credential_kind,
        credential_fingerprint: Some(fingerprint),
        cloud_threshold: engine_config.cloud_threshold,
    };
    let engine = Arc::new(
        EarthEngineHttpClient::new(engine_config, credentials, clock.clone())
            .map_err(|e| std::io::Error::other(format!("Earth Engine client setup failed: {e}")))?,
    );

    let gemini = settings.gemini().map_err(std::io::Error::other)?;
    let (model, model_summary) = build_model(settings, &gemini)?;

    let weather_config = settings.nasa_power().map_err(std::io::Error::other)?;
    let weather = NasaPowerHttpSource::new(&weather_config)
        .map_err(|e| std::io::Error::other(format!("NASA POWER client setup failed: {e}")))?;

    info!(
        project = %engine_summary.project,
        collection = %engine_summary.collection,
        credentials = %engine_summary.credentials,
        gemini_configured = model_summary.configured,
        weather_api = %weather_config.endpoint,
        "upstream adapters configured"
    );

    let http_state = HttpState::new(HttpStatePorts {
        maps: engine.clone(),
        series: engine.clone(),
        model,
        weather: Arc::new(weather),
        clock,
    })
    .with_latency_days(settings.latency_days())
    .with_summary(ServiceSummary {
        earth_engine: engine_summary,
        gemini: model_summary,
        weather_api: weather_config.endpoint.to_string(),
        latency_days: settings.latency_days(),
    });

    Ok(ServerState {
        http_state: attach_metrics(http_state, config)?,
        session: engine,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use rstest::{fixture, rstest};
    use zeroize::Zeroizing;

    #[fixture]
    fn settings() -> AppSettings {
        AppSettings {
            host: None,
            port: None,
            ee_project: Some("farm-lab".to_owned()),
            ee_api_base: None,
            ee_collection: None,
            cloud_threshold: Some(35.0),
            ee_service_account_key: None,
            ee_access_token: Some("ya29.token".to_owned()),
            latency_days: Some(5),
            request_timeout_secs: None,
            bootstrap_attempts: None,
            bootstrap_wait_secs: None,
            gemini_api_key: None,
            gemini_model: None,
            gemini_base_url: None,
            weather_api_url: None,
            cors_allowed_origins: None,
        }
    }

    fn server_config() -> ServerConfig {
        ServerConfig::new(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
    }

    #[rstest]
    fn access_tokens_are_fingerprinted_not_echoed() {
        let credentials = EarthEngineCredentials::AccessToken(Zeroizing::new("abc".to_owned()));
        let (kind, fingerprint) = describe_credentials(&credentials);
        assert_eq!(kind, "access_token");
        assert_eq!(fingerprint, "ba7816bf8f01cfea");
    }

    #[rstest]
    fn summarises_configured_adapters(settings: AppSettings) {
        let state = build_server_state(&settings, &server_config()).expect("state builds");
        let summary = &state.http_state.summary;
        assert_eq!(summary.earth_engine.project, "farm-lab");
        assert_eq!(summary.earth_engine.credentials, "access_token");
        assert_eq!(summary.earth_engine.cloud_threshold, 35.0);
        assert_eq!(summary.latency_days, 5);
        assert!(!summary.gemini.configured);
        assert!(summary.gemini.api_key_fingerprint.is_none());
        assert_eq!(
            summary.weather_api,
            "https://power.larc.nasa.gov/api/temporal/daily/point"
        );
    }

    #[rstest]
    fn gemini_key_enables_the_model(mut settings: AppSettings) {
        settings.gemini_api_key = Some("abc".to_owned());
        let state = build_server_state(&settings, &server_config()).expect("state builds");
        let gemini = &state.http_state.summary.gemini;
        assert!(gemini.configured);
        assert_eq!(gemini.api_key_fingerprint.as_deref(), Some("ba7816bf8f01cfea"));
    }

    #[rstest]
    fn malformed_weather_endpoint_aborts_startup(mut settings: AppSettings) {
        settings.weather_api_url = Some("power archive".to_owned());
        let Err(error) = build_server_state(&settings, &server_config()) else {
            panic!("startup must fail with a malformed endpoint");
        };
        assert!(error.to_string().contains("weather_api_url"));
    }

    #[rstest]
    fn missing_credentials_abort_startup(mut settings: AppSettings) {
        settings.ee_access_token = None;
        let Err(error) = build_server_state(&settings, &server_config()) else {
            panic!("startup must fail without credentials");
        };
        assert!(error.to_string().contains("no Earth Engine credentials"));
    }
}
