//! AI crop recommendation handler.
//!
//! ```text
//! POST /api/crop-recommendations  Generate crop advice for one field
//! ```
//!
//! Attribute values may be sent as JSON strings, numbers or booleans; they
//! are rendered as text before templating. Empty `weather_data` or
//! `vegetation_data` objects are treated as absent.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::crop_advice::{
    CropAdviceRequest, FieldProfile, VegetationSnapshot, WeatherSnapshot,
};
use crate::domain::{CropRecommendation, Error, missing_field_error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::NO_INPUT_MESSAGE;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Request payload for crop recommendations.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct CropRecommendationRequest {
    /// Field attributes: `location`, `area`, `soil_type`, `soil_ph`,
    /// `irrigation`, `experience`, `budget`.
    #[schema(value_type = Object, example = json!({"location": "Punjab, India", "soil_type": "Loamy", "area": 2.5}))]
    pub field_data: Option<Map<String, Value>>,
    /// Weather attributes: `avg_temp`, `rainfall`, `humidity`, `pattern`.
    #[schema(value_type = Option<Object>)]
    pub weather_data: Option<Value>,
    /// Vegetation attributes: `ndvi`, `soil_health`, `prev_performance`.
    #[schema(value_type = Option<Object>)]
    pub vegetation_data: Option<Value>,
}

/// Successful recommendation payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct CropRecommendationResponse {
    #[schema(example = "success")]
    pub status: String,
    pub ai_generated: bool,
    /// Structured advice parsed from the model reply.
    #[schema(value_type = Object)]
    pub recommendations: Value,
    #[schema(example = "2025-11-03T08:15:00Z")]
    pub generated_at: String,
    #[schema(example = "Punjab, India")]
    pub field_location: String,
}

impl From<CropRecommendation> for CropRecommendationResponse {
    fn from(value: CropRecommendation) -> Self {
        Self {
            status: value.status.to_owned(),
            ai_generated: value.ai_generated,
            recommendations: value.recommendations,
            generated_at: value.generated_at,
            field_location: value.field_location,
        }
    }
}

fn text(attributes: &Map<String, Value>, key: &str) -> Option<String> {
    match attributes.get(key)? {
        Value::Null => None,
        Value::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

fn non_empty_object(value: Option<Value>) -> Option<Map<String, Value>> {
    match value? {
        Value::Object(map) if !map.is_empty() => Some(map),
        _ => None,
    }
}

pub(crate) fn parse_crop_request(
    request: CropRecommendationRequest,
) -> Result<CropAdviceRequest, Error> {
    let CropRecommendationRequest {
        field_data,
        weather_data,
        vegetation_data,
    } = request;
    if field_data.is_none() && weather_data.is_none() && vegetation_data.is_none() {
        return Err(Error::invalid_request(NO_INPUT_MESSAGE));
    }
    let field = field_data.ok_or_else(|| missing_field_error("field_data"))?;

    let weather = non_empty_object(weather_data).map(|weather| WeatherSnapshot {
        avg_temp: text(&weather, "avg_temp"),
        rainfall: text(&weather, "rainfall"),
        humidity: text(&weather, "humidity"),
        pattern: text(&weather, "pattern"),
    });
    let vegetation = non_empty_object(vegetation_data).map(|vegetation| VegetationSnapshot {
        ndvi: text(&vegetation, "ndvi"),
        soil_health: text(&vegetation, "soil_health"),
        prev_performance: text(&vegetation, "prev_performance"),
    });

    Ok(CropAdviceRequest {
        field: FieldProfile {
            location: text(&field, "location"),
            area: text(&field, "area"),
            soil_type: text(&field, "soil_type"),
            soil_ph: text(&field, "soil_ph"),
            irrigation: text(&field, "irrigation"),
            experience: text(&field, "experience"),
            budget: text(&field, "budget"),
        },
        weather,
        vegetation,
    })
}

/// Generate crop recommendations for a field.
///
/// # Errors
///
/// - `400 Bad Request`: missing body or `field_data`.
/// - `503 Service Unavailable`: the model is not configured (static fallback
///   advice in `details.recommendations`) or the model call failed.
#[utoipa::path(
    post,
    path = "/api/crop-recommendations",
    request_body = CropRecommendationRequest,
    responses(
        (status = 200, description = "Recommendations generated", body = CropRecommendationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Model unavailable", body = ErrorSchema)
    ),
    tags = ["crop-recommendations"],
    operation_id = "cropRecommendations"
)]
#[post("/crop-recommendations")]
pub async fn crop_recommendations(
    state: web::Data<HttpState>,
    payload: web::Json<CropRecommendationRequest>,
) -> ApiResult<web::Json<CropRecommendationResponse>> {
    let request = parse_crop_request(payload.into_inner())?;
    let recommendation = state.crop_advice.recommend(request).await?;
    Ok(web::Json(recommendation.into()))
}
