//! Backend entry-point: loads settings, authenticates with Earth Engine, and
//! serves the vegetation index and crop advice API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use agriscope_backend::domain::{TokioSleeper, authenticate_with_retry};
use agriscope_backend::inbound::http::health::HealthState;
use agriscope_backend::settings::AppSettings;

use server::{ServerConfig, ServerState, build_server_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;

    let config = ServerConfig::new(settings.bind_addr()).with_cors_origins(settings.cors_origins());
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::make_metrics()?));

    let ServerState {
        http_state,
        session,
    } = build_server_state(&settings, &config)?;

    let health_state = web::Data::new(HealthState::new());
    let bind_addr = config.bind_addr();
    let server = create_server(health_state.clone(), http_state, config)?;
    info!(%bind_addr, "listening");

    let handle = server.handle();
    let serving = actix_web::rt::spawn(server);

    match authenticate_with_retry(session.as_ref(), settings.bootstrap_policy(), &TokioSleeper).await {
        Ok(_) => health_state.mark_ready(),
        Err(e) => {
            error!(error = %e, "Earth Engine authentication failed; shutting down");
            health_state.mark_unhealthy();
            handle.stop(true).await;
            return Err(std::io::Error::other(format!(
                "Earth Engine authentication failed: {e}"
            )));
        }
    }

    serving
        .await
        .map_err(|e| std::io::Error::other(format!("server task failed: {e}")))?
}
