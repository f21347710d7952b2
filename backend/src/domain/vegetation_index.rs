//! Catalogue of supported vegetation indices.
//!
//! Each index couples a band-math formula with the visualisation used when
//! rendering map tiles. Index names are matched case-insensitively.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::Error;
use super::band_math::{Band, BandExpr};
use super::validation::{ValidationCode, field_value_error};

/// Colour ramp shared by the normalised indices.
const GREENNESS_PALETTE: &[&str] = &["blue", "white", "yellow", "green", "darkgreen"];
const RATIO_PALETTE: &[&str] = &["brown", "yellow", "lightgreen", "green", "darkgreen"];
const MOISTURE_PALETTE: &[&str] = &["red", "orange", "yellow", "lightgreen", "darkgreen"];

/// Supported vegetation index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IndexName {
    /// Simple ratio.
    Sr,
    /// Normalised difference vegetation index.
    #[default]
    Ndvi,
    /// Enhanced vegetation index.
    Evi,
    /// Soil-adjusted vegetation index.
    Savi,
    /// Atmospherically resistant vegetation index.
    Arvi,
    /// Moisture-adjusted vegetation index.
    Mavi,
}

impl IndexName {
    /// Every supported index, in catalogue order.
    pub const ALL: [Self; 6] = [
        Self::Sr,
        Self::Ndvi,
        Self::Evi,
        Self::Savi,
        Self::Arvi,
        Self::Mavi,
    ];

    /// Upper-case wire code, e.g. `NDVI`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Sr => "SR",
            Self::Ndvi => "NDVI",
            Self::Evi => "EVI",
            Self::Savi => "SAVI",
            Self::Arvi => "ARVI",
            Self::Mavi => "MAVI",
        }
    }

    /// Parse a caller-supplied name, reporting the supported set on failure.
    pub fn parse_field(field: &str, raw: &str) -> Result<Self, Error> {
        raw.parse().map_err(|_: UnknownIndexName| {
            let supported = Self::ALL.map(Self::code).join(", ");
            field_value_error(
                field,
                ValidationCode::UnknownIndex,
                raw,
                format!("unsupported index '{raw}'; supported indices: {supported}"),
            )
        })
    }

    /// Full definition of this index.
    pub fn definition(self) -> IndexDefinition {
        let nir = || BandExpr::band(Band::B8);
        let red = || BandExpr::band(Band::B4);
        let blue = || BandExpr::band(Band::B2);
        let k = BandExpr::constant;

        match self {
            Self::Sr => IndexDefinition {
                name: self,
                full_name: "Simple Ratio",
                description: "Ratio of near-infrared to red reflectance; \
                              saturates less than NDVI over dense canopies.",
                expression: nir().over(red()),
                visualization: VisualizationParams::new(0.0, 8.0, RATIO_PALETTE),
                typical_range: (0.0, 30.0),
            },
            Self::Ndvi => IndexDefinition {
                name: self,
                full_name: "Normalized Difference Vegetation Index",
                description: "General-purpose greenness indicator for crop vigour and biomass.",
                expression: nir().minus(red()).over(nir().plus(red())),
                visualization: VisualizationParams::new(-0.2, 1.0, GREENNESS_PALETTE),
                typical_range: (-1.0, 1.0),
            },
            Self::Evi => IndexDefinition {
                name: self,
                full_name: "Enhanced Vegetation Index",
                description: "Corrects for canopy background and atmospheric effects; \
                              remains sensitive in high-biomass regions.",
                expression: k(2.5).times(nir().minus(red())).over(
                    nir()
                        .plus(k(6.0).times(red()))
                        .minus(k(7.5).times(blue()))
                        .plus(k(1.0)),
                ),
                visualization: VisualizationParams::new(-0.2, 1.0, GREENNESS_PALETTE),
                typical_range: (-1.0, 1.0),
            },
            Self::Savi => IndexDefinition {
                name: self,
                full_name: "Soil Adjusted Vegetation Index",
                description: "Reduces soil brightness influence where vegetation cover is sparse.",
                expression: k(1.5)
                    .times(nir().minus(red()))
                    .over(nir().plus(red()).plus(k(0.5))),
                visualization: VisualizationParams::new(-0.2, 1.0, GREENNESS_PALETTE),
                typical_range: (-1.0, 1.0),
            },
            Self::Arvi => {
                let corrected_red = || k(2.0).times(red()).minus(blue());
                IndexDefinition {
                    name: self,
                    full_name: "Atmospherically Resistant Vegetation Index",
                    description: "Uses the blue band to correct red reflectance for aerosol scattering.",
                    expression: nir()
                        .minus(corrected_red())
                        .over(nir().plus(corrected_red())),
                    visualization: VisualizationParams::new(-0.2, 1.0, GREENNESS_PALETTE),
                    typical_range: (-1.0, 1.0),
                }
            }
            Self::Mavi => IndexDefinition {
                name: self,
                full_name: "Moisture Adjusted Vegetation Index",
                description: "Adds short-wave infrared to the denominator to account for \
                              canopy water content.",
                expression: nir()
                    .minus(red())
                    .over(nir().plus(red()).plus(BandExpr::band(Band::B11))),
                visualization: VisualizationParams::new(0.0, 1.0, MOISTURE_PALETTE),
                typical_range: (0.0, 1.0),
            },
        }
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a string names no supported index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown vegetation index: {0}")]
pub struct UnknownIndexName(pub String);

impl FromStr for IndexName {
    type Err = UnknownIndexName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|index| index.code().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownIndexName(s.to_owned()))
    }
}

/// Rendering parameters for map tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationParams {
    /// Value mapped to the first palette colour.
    pub min: f64,
    /// Value mapped to the last palette colour.
    pub max: f64,
    /// Colour ramp, low to high.
    pub palette: Vec<String>,
}

impl VisualizationParams {
    fn new(min: f64, max: f64, palette: &[&str]) -> Self {
        Self {
            min,
            max,
            palette: palette.iter().map(|colour| (*colour).to_owned()).collect(),
        }
    }
}

/// Everything known about one index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    /// Index code.
    pub name: IndexName,
    /// Human-readable name.
    pub full_name: &'static str,
    /// Short agronomic description.
    pub description: &'static str,
    /// Band-math formula over scaled reflectance.
    pub expression: BandExpr,
    /// Default tile rendering.
    pub visualization: VisualizationParams,
    /// Theoretical `(min, max)` of the index.
    pub typical_range: (f64, f64),
}

impl IndexDefinition {
    /// Metadata as listed to callers.
    pub fn metadata(&self) -> IndexMetadata {
        IndexMetadata {
            name: self.full_name.to_owned(),
            description: self.description.to_owned(),
            formula: self.expression.to_string(),
            bands: self
                .expression
                .bands()
                .into_iter()
                .map(|band| band.id().to_owned())
                .collect(),
            range: [self.typical_range.0, self.typical_range.1],
            visualization: self.visualization.clone(),
        }
    }
}

/// Serialisable description of an index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexMetadata {
    /// Human-readable name.
    pub name: String,
    /// Short agronomic description.
    pub description: String,
    /// Formula over spectral labels, e.g. `(NIR - RED) / (NIR + RED)`.
    pub formula: String,
    /// Band identifiers read by the formula.
    pub bands: Vec<String>,
    /// Theoretical `[min, max]`.
    pub range: [f64; 2],
    /// Default tile rendering.
    pub visualization: VisualizationParams,
}

/// Definitions of all supported indices in catalogue order.
pub fn catalogue() -> Vec<IndexDefinition> {
    IndexName::ALL.into_iter().map(IndexName::definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn reflectance(band: Band) -> f64 {
        match band {
            Band::B2 => 0.04,
            Band::B4 => 0.05,
            Band::B8 => 0.45,
            Band::B11 => 0.20,
        }
    }

    #[rstest]
    #[case("ndvi", IndexName::Ndvi)]
    #[case("NDVI", IndexName::Ndvi)]
    #[case(" Evi ", IndexName::Evi)]
    #[case("sr", IndexName::Sr)]
    #[case("Mavi", IndexName::Mavi)]
    fn parses_names_case_insensitively(#[case] raw: &str, #[case] expected: IndexName) {
        assert_eq!(raw.parse::<IndexName>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_names_listing_supported_set() {
        let error = IndexName::parse_field("index_name", "GNDVI").expect_err("unknown index");
        assert!(error.message().contains("SR, NDVI, EVI, SAVI, ARVI, MAVI"));
        assert_eq!(
            error.details().and_then(|d| d.get("code")).and_then(|v| v.as_str()),
            Some("unknown_index")
        );
    }

    #[rstest]
    fn defaults_to_ndvi() {
        assert_eq!(IndexName::default(), IndexName::Ndvi);
    }

    #[rstest]
    #[case(IndexName::Sr, 9.0)]
    #[case(IndexName::Ndvi, 0.4 / 0.5)]
    #[case(IndexName::Evi, 2.5 * 0.4 / (0.45 + 0.3 - 0.3 + 1.0))]
    #[case(IndexName::Savi, 1.5 * 0.4 / 1.0)]
    #[case(IndexName::Arvi, (0.45 - 0.06) / (0.45 + 0.06))]
    #[case(IndexName::Mavi, 0.4 / 0.7)]
    fn formulas_match_reference_values(#[case] index: IndexName, #[case] expected: f64) {
        let value = index.definition().expression.evaluate(&reflectance);
        assert!(
            (value - expected).abs() < 1e-9,
            "{index}: expected {expected}, got {value}"
        );
    }

    #[rstest]
    fn ndvi_metadata_uses_standard_palette() {
        let metadata = IndexName::Ndvi.definition().metadata();
        assert_eq!(metadata.formula, "(NIR - RED) / (NIR + RED)");
        assert_eq!(metadata.bands, vec!["B4", "B8"]);
        assert_eq!(metadata.visualization.min, -0.2);
        assert_eq!(metadata.visualization.max, 1.0);
        assert_eq!(
            metadata.visualization.palette,
            vec!["blue", "white", "yellow", "green", "darkgreen"]
        );
    }

    #[rstest]
    fn catalogue_lists_every_index_once() {
        let names: Vec<_> = catalogue().into_iter().map(|d| d.name).collect();
        assert_eq!(names, IndexName::ALL.to_vec());
    }
}
