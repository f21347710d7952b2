//! Advisor prompt template.

use chrono::{DateTime, Datelike, Utc};

use super::{FieldProfile, VegetationSnapshot, WeatherSnapshot};

const PREAMBLE: &str = "You are an expert agricultural advisor with deep knowledge of Indian \
farming, crop selection, and precision agriculture.\n\
Provide specific, actionable crop recommendations for a farm field with the following \
characteristics:\n";

const REQUIREMENTS: &str = r#"
REQUIREMENTS:
Please provide crop recommendations in the following JSON format. Give exactly 3 crop recommendations, prioritized by suitability:

{
    "primary_crop": {
        "name": "Crop name",
        "variety": "Specific variety if applicable",
        "suitability_score": 95,
        "planting_season": "Best time to plant",
        "harvest_time": "Expected harvest period",
        "expected_yield": "Expected yield per hectare",
        "market_price": "Current market price range",
        "water_requirement": "Water needs (Low/Medium/High)",
        "investment_cost": "Estimated cost per hectare",
        "profit_potential": "Expected profit margins",
        "growing_tips": [
            "Specific tip 1",
            "Specific tip 2",
            "Specific tip 3"
        ],
        "challenges": [
            "Potential challenge 1",
            "Potential challenge 2"
        ],
        "market_demand": "High/Medium/Low with explanation"
    },
    "secondary_crop": {
        // Same structure as primary_crop
    },
    "alternative_crop": {
        // Same structure as primary_crop
    },
    "general_advice": {
        "soil_preparation": "Specific soil prep advice",
        "fertilizer_plan": "NPK and organic fertilizer recommendations",
        "pest_management": "Common pests and prevention",
        "irrigation_schedule": "Optimal watering schedule",
        "companion_crops": ["Crops that grow well together"],
        "crop_rotation": "Future crop rotation suggestions"
    },
    "seasonal_calendar": {
        "pre_monsoon": "Activities before monsoon",
        "monsoon": "Monsoon season activities",
        "post_monsoon": "Post-monsoon activities",
        "winter": "Winter season activities"
    }
}

Focus on:
1. Crops suitable for the current season and location
2. Economic viability and market demand
3. Water availability and irrigation requirements
4. Farmer's experience level and budget
5. Sustainable farming practices
6. Local climate patterns and soil conditions

Provide practical, implementable advice that considers Indian agricultural practices, government schemes, and local market conditions.
"#;

fn or<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value.as_deref().unwrap_or(default)
}

/// Render the advisor prompt for one field.
///
/// `now` supplies the month and year the model should plan around.
pub fn build_prompt(
    field: &FieldProfile,
    weather: Option<&WeatherSnapshot>,
    vegetation: Option<&VegetationSnapshot>,
    now: DateTime<Utc>,
) -> String {
    let mut prompt = String::from(PREAMBLE);

    prompt.push_str(&format!(
        "\nFIELD INFORMATION:\n\
         - Location: {}\n\
         - Field Size: {} hectares\n\
         - Soil Type: {}\n\
         - Soil pH: {}\n\
         - Irrigation: {}\n\
         - Current Month: {} {}\n\
         - Farmer Experience: {}\n\
         - Budget: {}\n",
        or(&field.location, "India"),
        or(&field.area, "Unknown"),
        or(&field.soil_type, "Not specified"),
        or(&field.soil_ph, "Not tested"),
        or(&field.irrigation, "Not specified"),
        now.format("%B"),
        now.year(),
        or(&field.experience, "Not specified"),
        or(&field.budget, "Not specified"),
    ));

    if let Some(weather) = weather {
        prompt.push_str(&format!(
            "\nWEATHER CONDITIONS:\n\
             - Average Temperature: {}°C\n\
             - Rainfall: {}mm\n\
             - Humidity: {}%\n\
             - Recent Weather Pattern: {}\n",
            or(&weather.avg_temp, "N/A"),
            or(&weather.rainfall, "N/A"),
            or(&weather.humidity, "N/A"),
            or(&weather.pattern, "Normal"),
        ));
    }

    if let Some(vegetation) = vegetation {
        prompt.push_str(&format!(
            "\nFIELD HEALTH DATA:\n\
             - NDVI Score: {} (Vegetation health indicator)\n\
             - Soil Health: {}\n\
             - Previous Crop Performance: {}\n",
            or(&vegetation.ndvi, "N/A"),
            or(&vegetation.soil_health, "Average"),
            or(&vegetation.prev_performance, "Unknown"),
        ));
    }

    prompt.push_str(REQUIREMENTS);
    prompt
}
