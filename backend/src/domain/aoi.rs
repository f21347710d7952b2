//! Area of interest submitted by callers.
//!
//! Coordinates arrive as `[lng, lat]` pairs in WGS84. The polygon is passed
//! to the geospatial engine as a single outer ring; the engine closes open
//! rings itself, so both open and explicitly closed rings are accepted.

use super::Error;
use super::validation::{ValidationCode, field_error, field_index_error};

const FIELD: &str = "coordinates";
const MIN_VERTICES: usize = 3;

/// One polygon vertex in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    /// Longitude in `[-180, 180]`.
    pub lng: f64,
    /// Latitude in `[-90, 90]`.
    pub lat: f64,
}

impl LngLat {
    fn as_pair(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// Validated polygon describing the caller's field.
///
/// ## Invariants
/// - at least three distinct vertices once a closing vertex is ignored;
/// - every vertex is finite and inside WGS84 bounds.
///
/// # Examples
/// ```
/// use agriscope_backend::domain::AreaOfInterest;
///
/// let aoi = AreaOfInterest::try_from_coordinates(vec![
///     vec![-93.098, 41.878],
///     vec![-93.088, 41.878],
///     vec![-93.088, 41.888],
/// ])
/// .expect("valid triangle");
/// assert_eq!(aoi.vertices().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AreaOfInterest {
    vertices: Vec<LngLat>,
}

impl AreaOfInterest {
    /// Validate raw `[lng, lat]` pairs into an area of interest.
    pub fn try_from_coordinates(coordinates: Vec<Vec<f64>>) -> Result<Self, Error> {
        if coordinates.len() < MIN_VERTICES {
            return Err(too_few_vertices());
        }

        let vertices = coordinates
            .into_iter()
            .enumerate()
            .map(|(index, pair)| parse_vertex(index, &pair))
            .collect::<Result<Vec<_>, _>>()?;

        if distinct_vertices(&vertices).len() < MIN_VERTICES {
            return Err(too_few_vertices());
        }

        Ok(Self { vertices })
    }

    /// Vertices in the order supplied by the caller.
    pub fn vertices(&self) -> &[LngLat] {
        &self.vertices
    }

    /// Vertices as `[lng, lat]` pairs, as echoed back to callers.
    pub fn to_pairs(&self) -> Vec<[f64; 2]> {
        self.vertices.iter().copied().map(LngLat::as_pair).collect()
    }

    /// Arithmetic mean of the distinct vertices.
    ///
    /// Point services such as the weather archive are queried here. A
    /// closing vertex or repeated vertex does not pull the point towards
    /// itself.
    ///
    /// ```
    /// use agriscope_backend::domain::{AreaOfInterest, LngLat};
    ///
    /// let aoi = AreaOfInterest::try_from_coordinates(vec![
    ///     vec![0.0, 0.0],
    ///     vec![2.0, 0.0],
    ///     vec![2.0, 2.0],
    ///     vec![0.0, 2.0],
    ///     vec![0.0, 0.0],
    /// ])
    /// .expect("valid square");
    /// assert_eq!(aoi.centroid(), LngLat { lng: 1.0, lat: 1.0 });
    /// ```
    pub fn centroid(&self) -> LngLat {
        let distinct = distinct_vertices(&self.vertices);
        let count = f64::from(u32::try_from(distinct.len()).unwrap_or(u32::MAX));
        let (lng, lat) = distinct
            .iter()
            .fold((0.0, 0.0), |(lng, lat), vertex| (lng + vertex.lng, lat + vertex.lat));
        LngLat {
            lng: lng / count,
            lat: lat / count,
        }
    }
}

fn too_few_vertices() -> Error {
    field_error(
        FIELD,
        ValidationCode::TooFewVertices,
        "AOI must have at least three coordinates",
    )
}

fn parse_vertex(index: usize, pair: &[f64]) -> Result<LngLat, Error> {
    let [lng, lat] = pair else {
        return Err(field_index_error(
            FIELD,
            ValidationCode::InvalidVertex,
            index,
            "each coordinate must be a [lng, lat] pair",
        ));
    };
    if !lng.is_finite() || !lat.is_finite() {
        return Err(field_index_error(
            FIELD,
            ValidationCode::InvalidVertex,
            index,
            "coordinates must be finite numbers",
        ));
    }
    if !(-180.0..=180.0).contains(lng) {
        return Err(field_index_error(
            FIELD,
            ValidationCode::OutOfRange,
            index,
            "longitude must be within [-180, 180]",
        ));
    }
    if !(-90.0..=90.0).contains(lat) {
        return Err(field_index_error(
            FIELD,
            ValidationCode::OutOfRange,
            index,
            "latitude must be within [-90, 90]",
        ));
    }
    Ok(LngLat {
        lng: *lng,
        lat: *lat,
    })
}

fn distinct_vertices(vertices: &[LngLat]) -> Vec<LngLat> {
    let ring = match (vertices.first(), vertices.last()) {
        (Some(first), Some(last)) if vertices.len() > 1 && first == last => {
            &vertices[..vertices.len() - 1]
        }
        _ => vertices,
    };
    let mut distinct: Vec<LngLat> = Vec::with_capacity(ring.len());
    for vertex in ring {
        if !distinct.contains(vertex) {
            distinct.push(*vertex);
        }
    }
    distinct
}
