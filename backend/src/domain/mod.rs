//! Domain primitives, ports, and services.
//!
//! Purpose: validate caller input for vegetation index and crop advice
//! requests, describe the driven ports the remote engine, language model and
//! weather archive adapters implement, and orchestrate calls to them. Nothing here knows
//! about HTTP or the wire formats of the remote services.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - AreaOfInterest / ObservationWindow: validated request inputs.
//! - IndexName / IndexDefinition: vegetation index catalogue.
//! - VegetationIndexService / CropRecommendationService / WeatherService:
//!   use-cases.

pub mod aoi;
pub mod band_math;
pub mod bootstrap;
pub mod crop_advice;
pub mod crop_recommendation_service;
pub mod date_range;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod validation;
pub mod vegetation_index;
pub mod vegetation_service;
pub mod weather_service;

pub use self::aoi::{AreaOfInterest, LngLat};
pub use self::band_math::{Band, BandExpr, BinaryOp};
pub use self::bootstrap::{RetryPolicy, Sleeper, TokioSleeper, authenticate_with_retry};
pub use self::crop_recommendation_service::{CropRecommendation, CropRecommendationService};
pub use self::date_range::ObservationWindow;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::validation::{ValidationCode, missing_field_error};
pub use self::vegetation_index::{
    IndexDefinition, IndexMetadata, IndexName, UnknownIndexName, VisualizationParams, catalogue,
};
pub use self::vegetation_service::{
    DEFAULT_LATENCY_DAYS, IndexMapOutcome, IndexQuery, IndexSeriesOutcome, NO_IMAGERY_MESSAGE,
    SeriesPoint, VegetationIndexService,
};
pub use self::weather_service::{WEATHER_UNAVAILABLE_MESSAGE, WeatherQuery, WeatherService};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use agriscope_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
