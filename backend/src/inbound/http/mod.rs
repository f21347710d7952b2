//! HTTP inbound adapter exposing REST endpoints.

pub mod cors;
pub mod crop_recommendations;
pub mod debug;
pub mod error;
pub mod health;
pub mod indices;
pub mod indices_dto;
pub mod legacy;
pub mod schemas;
pub mod state;
pub mod weather;

use actix_web::web;

pub use cors::cors_policy;
pub use error::{ApiResult, json_error_handler};

/// Register the route table and JSON extractor settings.
///
/// Handlers expect [`state::HttpState`] and [`health::HealthState`] to be
/// registered as app data by the caller.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use agriscope_backend::inbound::http::configure;
/// use agriscope_backend::inbound::http::health::HealthState;
/// use agriscope_backend::inbound::http::state::{HttpState, HttpStatePorts};
///
/// let app = App::new()
///     .app_data(web::Data::new(HealthState::new()))
///     .app_data(web::Data::new(HttpState::new(HttpStatePorts::default())))
///     .configure(configure);
/// # drop(app);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(
            web::scope("/api")
                .service(indices::list_indices)
                .service(indices::calculate_index)
                .service(indices::index_time_series)
                .service(crop_recommendations::crop_recommendations)
                .service(weather::weather_data)
                .service(debug::debug_status),
        )
        .service(legacy::process_ndvi)
        .service(legacy::ndvi_time_series)
        .service(health::ready)
        .service(health::live);
}
