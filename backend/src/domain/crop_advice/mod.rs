//! Crop advice: prompt templating and best-effort reply parsing.
//!
//! The language model is asked for a JSON document but replies in free
//! text. Parsing therefore never fails: unparseable replies are wrapped in
//! a minimal structured object carrying the full text.

mod fallback;
mod prompt;
mod reply;

pub use fallback::fallback_recommendations;
pub use prompt::build_prompt;
pub use reply::parse_model_reply;

/// Field characteristics supplied by the farmer.
///
/// Every attribute is optional; absent values render as neutral defaults in
/// the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldProfile {
    /// Free-form location, e.g. `Punjab, India`.
    pub location: Option<String>,
    /// Field size in hectares.
    pub area: Option<String>,
    /// Soil type, e.g. `Loamy`.
    pub soil_type: Option<String>,
    /// Measured soil pH.
    pub soil_ph: Option<String>,
    /// Irrigation available to the field.
    pub irrigation: Option<String>,
    /// Farmer experience level.
    pub experience: Option<String>,
    /// Budget description.
    pub budget: Option<String>,
}

impl FieldProfile {
    /// Location echoed back in recommendation responses.
    pub fn reported_location(&self) -> &str {
        self.location.as_deref().unwrap_or("Unknown")
    }
}

/// Recent weather at the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherSnapshot {
    /// Average temperature in °C.
    pub avg_temp: Option<String>,
    /// Rainfall in millimetres.
    pub rainfall: Option<String>,
    /// Relative humidity in percent.
    pub humidity: Option<String>,
    /// Qualitative recent pattern.
    pub pattern: Option<String>,
}

/// Vegetation health observed at the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VegetationSnapshot {
    /// Recent NDVI score.
    pub ndvi: Option<String>,
    /// Qualitative soil health.
    pub soil_health: Option<String>,
    /// How the previous crop performed.
    pub prev_performance: Option<String>,
}

/// Everything the advisor needs for one recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CropAdviceRequest {
    /// Field characteristics.
    pub field: FieldProfile,
    /// Weather, when known.
    pub weather: Option<WeatherSnapshot>,
    /// Vegetation health, when known.
    pub vegetation: Option<VegetationSnapshot>,
}
