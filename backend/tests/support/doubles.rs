//! Recording doubles for the driven ports.
//!
//! Each double stores the requests it receives and replies with a
//! configurable result, so suites can assert on both the HTTP response and
//! what reached the port.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use agriscope_backend::domain::ports::{
    CropAdvisorModel, CropAdvisorModelError, GeospatialEngineError, IndexMap, IndexMapRequest,
    IndexSample, IndexSeriesRequest, VegetationMapSource, VegetationSeriesSource, WeatherReport,
    WeatherRequest, WeatherSource, WeatherSourceError,
};

/// Call log plus the reply handed to every call.
pub(crate) struct Recorder<Call, Reply> {
    calls: Arc<Mutex<Vec<Call>>>,
    reply: Arc<Mutex<Reply>>,
}

impl<Call, Reply> Clone for Recorder<Call, Reply> {
    fn clone(&self) -> Self {
        Self {
            calls: Arc::clone(&self.calls),
            reply: Arc::clone(&self.reply),
        }
    }
}

impl<Call: Clone, Reply: Clone> Recorder<Call, Reply> {
    pub(crate) fn new(reply: Reply) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            reply: Arc::new(Mutex::new(reply)),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("recorder calls lock").clone()
    }

    pub(crate) fn set_reply(&self, reply: Reply) {
        *self.reply.lock().expect("recorder reply lock") = reply;
    }

    fn record(&self, call: Call) -> Reply {
        self.calls.lock().expect("recorder calls lock").push(call);
        self.reply.lock().expect("recorder reply lock").clone()
    }
}

pub(crate) type RecordingMapSource = Recorder<IndexMapRequest, Result<IndexMap, GeospatialEngineError>>;
pub(crate) type RecordingSeriesSource =
    Recorder<IndexSeriesRequest, Result<Vec<IndexSample>, GeospatialEngineError>>;
pub(crate) type RecordingAdvisorModel = Recorder<String, Result<String, CropAdvisorModelError>>;
pub(crate) type RecordingWeatherSource =
    Recorder<WeatherRequest, Result<WeatherReport, WeatherSourceError>>;

#[async_trait]
impl VegetationMapSource for RecordingMapSource {
    async fn render_index_map(
        &self,
        request: &IndexMapRequest,
    ) -> Result<IndexMap, GeospatialEngineError> {
        self.record(request.clone())
    }
}

#[async_trait]
impl VegetationSeriesSource for RecordingSeriesSource {
    async fn sample_index_series(
        &self,
        request: &IndexSeriesRequest,
    ) -> Result<Vec<IndexSample>, GeospatialEngineError> {
        self.record(request.clone())
    }
}

#[async_trait]
impl CropAdvisorModel for RecordingAdvisorModel {
    async fn generate(&self, prompt: &str) -> Result<String, CropAdvisorModelError> {
        self.record(prompt.to_owned())
    }
}

#[async_trait]
impl WeatherSource for RecordingWeatherSource {
    async fn fetch_daily_weather(
        &self,
        request: &WeatherRequest,
    ) -> Result<WeatherReport, WeatherSourceError> {
        self.record(request.clone())
    }
}

/// Clock pinned to 2025-08-01T12:00:00Z.
pub(crate) struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

pub(crate) fn tile_map(map_id: &str) -> IndexMap {
    IndexMap {
        map_id: map_id.to_owned(),
        tile_url: format!("https://earthengine.invalid/v1/{map_id}/tiles/{{z}}/{{x}}/{{y}}"),
    }
}

pub(crate) fn sample(date: &str, value: Option<f64>) -> IndexSample {
    IndexSample {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid sample date"),
        value,
    }
}

/// A small field near Ames, Iowa, as an open ring.
pub(crate) fn field_coordinates() -> Value {
    json!([
        [-93.098, 41.878],
        [-93.088, 41.878],
        [-93.088, 41.888],
        [-93.098, 41.888]
    ])
}

/// Index request body valid against [`FixtureClock`].
pub(crate) fn index_request(index_name: Option<&str>) -> Value {
    let mut body = json!({
        "coordinates": field_coordinates(),
        "start_date": "2025-06-01",
        "end_date": "2025-07-31",
    });
    if let Some(name) = index_name {
        body["index_name"] = json!(name);
    }
    body
}

/// Crop advice request body with every section populated.
pub(crate) fn crop_request() -> Value {
    json!({
        "field_data": {
            "location": "Punjab, India",
            "area": 2.5,
            "soil_type": "Loamy",
            "soil_ph": 6.8,
            "irrigation": "Drip",
            "experience": "Intermediate",
            "budget": "Medium"
        },
        "weather_data": {"avg_temp": 24, "rainfall": 650, "humidity": 70, "pattern": "Monsoon"},
        "vegetation_data": {"ndvi": 0.62, "soil_health": "Good", "prev_performance": "Average"}
    })
}

/// A trimmed POWER daily point reply for two days.
pub(crate) fn power_reply() -> WeatherReport {
    WeatherReport {
        payload: json!({
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-93.093, 41.883, 291.0]},
            "properties": {
                "parameter": {
                    "T2M": {"20250701": 24.3, "20250702": 25.1},
                    "PRECTOTCORR": {"20250701": 0.0, "20250702": 12.4}
                }
            },
            "header": {"title": "NASA/POWER CERES/MERRA2 Native Resolution Daily Data"}
        }),
    }
}

/// Weather request body for the field around [`field_coordinates`].
pub(crate) fn weather_request() -> Value {
    json!({
        "coordinates": field_coordinates(),
        "start_date": "2025-07-01",
        "end_date": "2025-07-02",
    })
}
