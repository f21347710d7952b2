//! Static advice served when no language model is configured.

use serde_json::{Value, json};

/// Conservative wheat recommendation for Indian rabi season.
pub fn fallback_recommendations() -> Value {
    json!({
        "primary_crop": {
            "name": "Wheat",
            "variety": "HD-2967 (High yielding)",
            "suitability_score": 80,
            "planting_season": "October-November",
            "harvest_time": "March-April",
            "expected_yield": "45-50 quintals/hectare",
            "growing_tips": [
                "Ensure proper seed treatment before sowing",
                "Maintain optimal soil moisture during flowering",
                "Apply balanced NPK fertilization"
            ]
        },
        "general_advice": {
            "note": "These are basic recommendations. For AI-powered suggestions, \
                     configure a Gemini API key."
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommends_wheat() {
        let value = fallback_recommendations();
        assert_eq!(value["primary_crop"]["name"], "Wheat");
        assert_eq!(value["primary_crop"]["growing_tips"].as_array().map(Vec::len), Some(3));
    }
}
