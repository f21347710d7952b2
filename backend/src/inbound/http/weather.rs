//! Field weather handler.
//!
//! ```text
//! POST /api/weather/data  Daily weather at the field centroid
//! ```
//!
//! The archive reply is relayed verbatim. Dates are `YYYY-MM-DD` and the
//! end date is inclusive.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{Error, WeatherQuery, missing_field_error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::NO_INPUT_MESSAGE;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;

/// Request payload for daily field weather.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct WeatherDataRequest {
    /// Field polygon as `[lng, lat]` pairs.
    #[schema(example = json!([[73.7, 19.9], [73.8, 19.9], [73.8, 20.0], [73.7, 19.9]]))]
    pub coordinates: Option<Vec<Vec<f64>>>,
    #[schema(example = "2025-07-01")]
    pub start_date: Option<String>,
    #[schema(example = "2025-07-31")]
    pub end_date: Option<String>,
}

pub(crate) fn parse_weather_request(request: WeatherDataRequest) -> Result<WeatherQuery, Error> {
    let WeatherDataRequest {
        coordinates,
        start_date,
        end_date,
    } = request;
    if coordinates.is_none() && start_date.is_none() && end_date.is_none() {
        return Err(Error::invalid_request(NO_INPUT_MESSAGE));
    }
    Ok(WeatherQuery {
        coordinates: coordinates.ok_or_else(|| missing_field_error("coordinates"))?,
        start_date: start_date.ok_or_else(|| missing_field_error("start_date"))?,
        end_date: end_date.ok_or_else(|| missing_field_error("end_date"))?,
    })
}

/// Fetch daily temperature, rainfall, humidity and irradiance for a field.
///
/// # Errors
///
/// - `400 Bad Request`: missing or invalid polygon or dates, or the archive
///   refused the range.
/// - `503 Service Unavailable`: the archive could not be reached.
#[utoipa::path(
    post,
    path = "/api/weather/data",
    request_body = WeatherDataRequest,
    responses(
        (status = 200, description = "Archive reply relayed verbatim", body = Object),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Weather archive unavailable", body = ErrorSchema)
    ),
    tags = ["weather"],
    operation_id = "weatherData"
)]
#[post("/weather/data")]
pub async fn weather_data(
    state: web::Data<HttpState>,
    payload: web::Json<WeatherDataRequest>,
) -> ApiResult<web::Json<Value>> {
    let query = parse_weather_request(payload.into_inner())?;
    let report = state.weather.daily_weather(query).await?;
    Ok(web::Json(report.payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn request(body: Value) -> WeatherDataRequest {
        serde_json::from_value(body).expect("valid request body")
    }

    #[rstest]
    fn empty_body_reports_no_input() {
        let error = parse_weather_request(request(json!({}))).expect_err("empty body");
        assert_eq!(error.message(), NO_INPUT_MESSAGE);
    }

    #[rstest]
    #[case(json!({"start_date": "2025-07-01", "end_date": "2025-07-02"}), "coordinates")]
    #[case(json!({"coordinates": [], "end_date": "2025-07-02"}), "start_date")]
    #[case(json!({"coordinates": [], "start_date": "2025-07-01"}), "end_date")]
    fn each_field_is_required(#[case] body: Value, #[case] field: &str) {
        let error = parse_weather_request(request(body)).expect_err("field missing");
        assert_eq!(error.message(), format!("missing required field: {field}"));
    }

    #[rstest]
    fn complete_bodies_become_queries() {
        let query = parse_weather_request(request(json!({
            "coordinates": [[1.0, 2.0]],
            "start_date": "2025-07-01",
            "end_date": "2025-07-02",
        })))
        .expect("complete body");
        assert_eq!(query.coordinates, vec![vec![1.0, 2.0]]);
        assert_eq!(query.end_date, "2025-07-02");
    }
}
