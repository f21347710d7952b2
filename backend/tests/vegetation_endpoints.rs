//! Endpoint tests for the index catalogue, index maps, and index series.

#[allow(dead_code, reason = "Shared helpers serve several integration suites.")]
mod support;

use actix_web::http::StatusCode;
use actix_web::{test, web};
use agriscope_backend::domain::ports::GeospatialEngineError;
use agriscope_backend::domain::{Band, IndexName};
use agriscope_backend::inbound::http::health::HealthState;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use support::app::{PortDoubles, test_app};
use support::doubles::{index_request, sample};

#[fixture]
fn doubles() -> PortDoubles {
    PortDoubles::default()
}

async fn post_json(doubles: &PortDoubles, path: &str, body: Value) -> (StatusCode, Value) {
    let app = test::init_service(test_app(
        web::Data::new(doubles.http_state()),
        web::Data::new(HealthState::new()),
    ))
    .await;
    let res = test::call_service(
        &app,
        test::TestRequest::post().uri(path).set_json(body).to_request(),
    )
    .await;
    let status = res.status();
    let body: Value = test::read_body_json(res).await;
    (status, body)
}

#[rstest]
#[actix_web::test]
async fn lists_every_supported_index(doubles: PortDoubles) {
    let app = test::init_service(test_app(
        web::Data::new(doubles.http_state()),
        web::Data::new(HealthState::new()),
    ))
    .await;
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/indices/list").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;

    assert_eq!(body["total_count"], json!(IndexName::ALL.len()));
    for name in IndexName::ALL {
        assert!(body["indices"].get(name.code()).is_some(), "{name} missing");
    }
    assert_eq!(body["indices"]["NDVI"]["formula"], "(NIR - RED) / (NIR + RED)");
    assert_eq!(body["indices"]["MAVI"]["bands"], json!(["B4", "B8", "B11"]));
}

#[rstest]
#[actix_web::test]
async fn renders_the_requested_index(doubles: PortDoubles) {
    let (status, body) =
        post_json(&doubles, "/api/indices/calculate", index_request(Some("evi"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["index_name"], "EVI");
    assert_eq!(body["map_id"], "projects/agriscope21/maps/ndvi-fixture");
    assert_eq!(body["start_date"], "2025-06-01");
    assert_eq!(body["end_date"], "2025-07-31");
    assert_eq!(body["coordinates"][0], json!([-93.098, 41.878]));
    assert_eq!(body["visualization_params"]["min"], json!(-0.2));

    let calls = doubles.maps.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].index.name, IndexName::Evi);
    assert_eq!(calls[0].index.expression.bands(), vec![Band::B2, Band::B4, Band::B8]);
    assert_eq!(calls[0].window.start_str(), "2025-06-01");
}

#[rstest]
#[actix_web::test]
async fn index_name_defaults_to_ndvi(doubles: PortDoubles) {
    let (status, body) = post_json(&doubles, "/api/indices/calculate", index_request(None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["index_name"], "NDVI");
}

#[rstest]
#[actix_web::test]
async fn series_drops_masked_scenes_and_sorts_by_date(doubles: PortDoubles) {
    doubles.series.set_reply(Ok(vec![
        sample("2025-07-20", Some(0.71)),
        sample("2025-06-05", Some(0.42)),
        sample("2025-06-25", None),
        sample("2025-07-01", Some(0.58)),
    ]));

    let (status, body) =
        post_json(&doubles, "/api/indices/timeseries", index_request(Some("SAVI"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["index_name"], "SAVI");
    assert_eq!(body["total_measurements"], 3);
    assert_eq!(
        body["time_series"],
        json!([
            {"date": "2025-06-05", "value": 0.42},
            {"date": "2025-07-01", "value": 0.58},
            {"date": "2025-07-20", "value": 0.71}
        ])
    );
}

#[rstest]
#[actix_web::test]
async fn empty_series_is_still_a_success(doubles: PortDoubles) {
    let (status, body) =
        post_json(&doubles, "/api/indices/timeseries", index_request(None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_measurements"], 0);
    assert_eq!(body["time_series"], json!([]));
}

#[rstest]
#[case(json!({}), "No input data provided")]
#[case(
    json!({"start_date": "2025-06-01", "end_date": "2025-07-31"}),
    "missing required field: coordinates"
)]
#[case(
    json!({"coordinates": [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]], "end_date": "2025-07-31"}),
    "missing required field: start_date"
)]
#[case(
    json!({"coordinates": [[0.0, 0.0], [1.0, 0.0]], "start_date": "2025-06-01", "end_date": "2025-07-31"}),
    "AOI must have at least three coordinates"
)]
#[actix_web::test]
async fn rejects_incomplete_requests(
    doubles: PortDoubles,
    #[case] body: Value,
    #[case] message: &str,
) {
    let (status, response) = post_json(&doubles, "/api/indices/calculate", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "invalid_request");
    assert_eq!(response["message"], message);
    assert!(doubles.maps.calls().is_empty());
}

#[rstest]
#[actix_web::test]
async fn rejects_unknown_index(doubles: PortDoubles) {
    let (status, body) =
        post_json(&doubles, "/api/indices/timeseries", index_request(Some("GNDVI"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "unknown_index");
    assert!(doubles.series.calls().is_empty());
}

#[rstest]
#[actix_web::test]
async fn rejects_windows_inside_processing_latency(doubles: PortDoubles) {
    let mut request = index_request(None);
    request["start_date"] = json!("2025-07-31");
    request["end_date"] = json!("2025-08-10");

    let (status, body) = post_json(&doubles, "/api/indices/calculate", request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["code"], "too_recent");
}

#[rstest]
#[case(GeospatialEngineError::NoImagery, StatusCode::NOT_FOUND, "not_found")]
#[case(
    GeospatialEngineError::timeout("deadline exceeded"),
    StatusCode::SERVICE_UNAVAILABLE,
    "service_unavailable"
)]
#[case(
    GeospatialEngineError::rejected("Geometry has no vertices"),
    StatusCode::BAD_REQUEST,
    "invalid_request"
)]
#[case(
    GeospatialEngineError::decode("missing name"),
    StatusCode::INTERNAL_SERVER_ERROR,
    "internal_error"
)]
#[actix_web::test]
async fn maps_engine_failures_to_statuses(
    doubles: PortDoubles,
    #[case] error: GeospatialEngineError,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    doubles.fail_engine(error);
    let (actual, body) = post_json(&doubles, "/api/indices/calculate", index_request(None)).await;
    assert_eq!(actual, status);
    assert_eq!(body["code"], code);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        assert_eq!(body["message"], "Internal server error");
    }
}

#[rstest]
#[actix_web::test]
async fn no_imagery_message_names_the_dataset(doubles: PortDoubles) {
    doubles.fail_engine(GeospatialEngineError::NoImagery);
    let (_, body) = post_json(&doubles, "/api/indices/timeseries", index_request(None)).await;
    assert_eq!(
        body["message"],
        "No Sentinel-2 data available for the specified AOI and dates"
    );
}

#[rstest]
#[actix_web::test]
async fn legacy_map_forces_ndvi(doubles: PortDoubles) {
    let (status, body) = post_json(&doubles, "/process_ndvi", index_request(Some("EVI"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body.get("index_name").is_none());
    assert_eq!(body["tile_url"].as_str().map(|url| url.contains("/tiles/")), Some(true));
    assert_eq!(doubles.maps.calls()[0].index.name, IndexName::Ndvi);
}

#[rstest]
#[actix_web::test]
async fn legacy_series_reports_ndvi_values(doubles: PortDoubles) {
    doubles.series.set_reply(Ok(vec![
        sample("2025-06-12", Some(0.51)),
        sample("2025-06-02", Some(0.47)),
    ]));

    let (status, body) = post_json(&doubles, "/ndvi_time_series", index_request(None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["time_series"],
        json!([
            {"date": "2025-06-02", "ndvi": 0.47},
            {"date": "2025-06-12", "ndvi": 0.51}
        ])
    );
    assert_eq!(doubles.series.calls()[0].index.name, IndexName::Ndvi);
}
