//! Driven port for rendering index composites as map tiles.

use async_trait::async_trait;

use super::GeospatialEngineError;
use crate::domain::{AreaOfInterest, IndexDefinition, ObservationWindow};

/// Composite to render: mean index value over the window, clipped to the
/// area of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMapRequest {
    /// Field polygon.
    pub aoi: AreaOfInterest,
    /// Imagery acquisition window.
    pub window: ObservationWindow,
    /// Index formula and visualisation.
    pub index: IndexDefinition,
}

/// Handle to a rendered map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexMap {
    /// Engine-issued map identifier.
    pub map_id: String,
    /// XYZ tile template containing `{z}`, `{x}` and `{y}` placeholders.
    pub tile_url: String,
}

/// Port for rendering vegetation index maps.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VegetationMapSource: Send + Sync {
    /// Render the mean composite described by `request`.
    ///
    /// Returns [`GeospatialEngineError::NoImagery`] when no scene matches.
    async fn render_index_map(
        &self,
        request: &IndexMapRequest,
    ) -> Result<IndexMap, GeospatialEngineError>;
}

/// Fixture implementation returning a deterministic tile template.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureVegetationMapSource;

#[async_trait]
impl VegetationMapSource for FixtureVegetationMapSource {
    async fn render_index_map(
        &self,
        request: &IndexMapRequest,
    ) -> Result<IndexMap, GeospatialEngineError> {
        let map_id = format!("projects/fixture/maps/{}", request.index.name.code().to_lowercase());
        Ok(IndexMap {
            tile_url: format!("https://tiles.invalid/v1/{map_id}/tiles/{{z}}/{{x}}/{{y}}"),
            map_id,
        })
    }
}
