//! Wire types for the Earth Engine REST API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::expression::Expression;
use crate::domain::VisualizationParams;
use crate::domain::ports::IndexSample;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ComputeValueRequestDto<'a> {
    pub(super) expression: &'a Expression,
}

#[derive(Debug, Deserialize)]
pub(super) struct ComputeValueResponseDto {
    #[serde(default)]
    pub(super) result: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RangeDto {
    min: f64,
    max: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VisualizationOptionsDto<'a> {
    ranges: [RangeDto; 1],
    palette_colors: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateMapRequestDto<'a> {
    expression: &'a Expression,
    file_format: &'static str,
    visualization_options: VisualizationOptionsDto<'a>,
}

impl<'a> CreateMapRequestDto<'a> {
    pub(super) fn new(expression: &'a Expression, visualization: &'a VisualizationParams) -> Self {
        Self {
            expression,
            file_format: "AUTO_JPEG_PNG",
            visualization_options: VisualizationOptionsDto {
                ranges: [RangeDto {
                    min: visualization.min,
                    max: visualization.max,
                }],
                palette_colors: &visualization.palette,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateMapResponseDto {
    pub(super) name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct FeatureCollectionDto {
    #[serde(default)]
    features: Vec<FeatureDto>,
}

#[derive(Debug, Deserialize)]
struct FeatureDto {
    #[serde(default)]
    properties: Map<String, Value>,
}

impl FeatureCollectionDto {
    /// Convert features into samples, skipping scenes without a usable date.
    pub(super) fn into_samples(self) -> Vec<IndexSample> {
        self.features
            .into_iter()
            .filter_map(|feature| {
                let date = feature
                    .properties
                    .get("date")
                    .and_then(Value::as_str)
                    .and_then(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok())?;
                let value = feature.properties.get("value").and_then(Value::as_f64);
                Some(IndexSample { date, value })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelopeDto {
    pub(super) error: ErrorBodyDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) message: String,
    #[serde(default)]
    pub(super) status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndexName;
    use serde_json::json;

    #[test]
    fn decodes_feature_properties_into_samples() {
        let body = json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": null,
                  "properties": { "date": "2025-06-03", "value": 0.42 } },
                { "type": "Feature", "geometry": null,
                  "properties": { "date": "2025-06-08", "value": null } },
                { "type": "Feature", "geometry": null,
                  "properties": { "value": 0.5 } }
            ]
        });
        let decoded: FeatureCollectionDto =
            serde_json::from_value(body).expect("feature collection decodes");
        let samples = decoded.into_samples();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, Some(0.42));
        assert_eq!(samples[1].value, None);
    }

    #[test]
    fn map_request_carries_palette_and_range() {
        let expression = Expression {
            result: "0".to_owned(),
            values: Map::new(),
        };
        let visualization = IndexName::Ndvi.definition().visualization;
        let body = serde_json::to_value(CreateMapRequestDto::new(&expression, &visualization))
            .expect("request serialises");

        assert_eq!(body["fileFormat"], "AUTO_JPEG_PNG");
        assert_eq!(body["visualizationOptions"]["ranges"][0]["min"], -0.2);
        assert_eq!(body["visualizationOptions"]["paletteColors"][4], "darkgreen");
        assert_eq!(body["expression"]["result"], "0");
    }
}
