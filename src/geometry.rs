//! Geometry types for routes and blockade areas.
//!
//! Coordinates are stored as (longitude, latitude) pairs in degrees, which is
//! also their GeoJSON wire order. Routes serialize as GeoJSON `LineString`
//! geometries and blockade areas as GeoJSON `Polygon` geometries, so they can
//! be passed straight through to and from OSRM and frontends. Spatial
//! predicates are delegated to `geo`.

use std::collections::HashSet;

use geo::{BoundingRect, Centroid, Contains, Coord, Densify, LineString, Point, Rect, coord};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// A single WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    fn bit_key(&self) -> (u64, u64) {
        (self.lon.to_bits(), self.lat.to_bits())
    }
}

impl From<[f64; 2]> for LonLat {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<LonLat> for [f64; 2] {
    fn from(point: LonLat) -> Self {
        [point.lon, point.lat]
    }
}

impl From<LonLat> for Coord<f64> {
    fn from(point: LonLat) -> Self {
        coord! { x: point.lon, y: point.lat }
    }
}

impl From<Coord<f64>> for LonLat {
    fn from(c: Coord<f64>) -> Self {
        Self::new(c.x, c.y)
    }
}

impl From<LonLat> for Point<f64> {
    fn from(point: LonLat) -> Self {
        Point::from(Coord::from(point))
    }
}

impl From<Point<f64>> for LonLat {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }
}

fn distinct_count(points: &[LonLat]) -> usize {
    points.iter().map(LonLat::bit_key).collect::<HashSet<_>>().len()
}

fn ensure_finite(points: &[LonLat]) -> Result<(), GeometryError> {
    if points.iter().all(LonLat::is_finite) {
        Ok(())
    } else {
        Err(GeometryError::NonFiniteCoordinate)
    }
}

// ============================================================================
// Polyline
// ============================================================================

/// A route geometry, serialized as a GeoJSON `LineString`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "LineString")]
pub struct Polyline {
    coordinates: Vec<LonLat>,
}

impl Polyline {
    pub fn new(points: Vec<LonLat>) -> Self {
        Self {
            coordinates: points,
        }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[LonLat] {
        &self.coordinates
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<LonLat> {
        self.coordinates
    }

    pub fn first(&self) -> Option<LonLat> {
        self.coordinates.first().copied()
    }

    pub fn last(&self) -> Option<LonLat> {
        self.coordinates.last().copied()
    }

    /// A usable route has finite coordinates and at least two distinct vertices.
    pub fn validate(&self) -> Result<(), GeometryError> {
        ensure_finite(&self.coordinates)?;
        let found = distinct_count(&self.coordinates);
        if found < 2 {
            return Err(GeometryError::TooFewVertices {
                kind: "route",
                required: 2,
                found,
            });
        }
        Ok(())
    }

    pub fn to_geo(&self) -> LineString<f64> {
        self.coordinates.iter().copied().map(Coord::from).collect()
    }

    /// Returns the vertices with evenly spaced points inserted so that no
    /// consecutive pair is further apart than `max_step` degrees. A line with
    /// non-finite coordinates is returned as-is.
    pub fn densify(&self, max_step: f64) -> Vec<LonLat> {
        if ensure_finite(&self.coordinates).is_err() {
            return self.coordinates.clone();
        }
        self.to_geo()
            .densify(max_step)
            .into_iter()
            .map(LonLat::from)
            .collect()
    }
}

// ============================================================================
// Polygon
// ============================================================================

/// A blockade area, serialized as a GeoJSON `Polygon`.
///
/// Rings are checked when the polygon is built or deserialized: each must be
/// closed, finite and hold at least three distinct vertices. Interior rings
/// are holes and are excluded from containment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolygonGeometry", into = "PolygonGeometry")]
pub struct Polygon {
    shape: geo::Polygon<f64>,
    bounds: Rect<f64>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename = "Polygon")]
struct PolygonGeometry {
    coordinates: Vec<Vec<LonLat>>,
}

impl Polygon {
    /// Builds a polygon from a closed exterior ring.
    pub fn new(ring: Vec<LonLat>) -> Result<Self, GeometryError> {
        Self::try_from(PolygonGeometry {
            coordinates: vec![ring],
        })
    }

    pub fn as_geo(&self) -> &geo::Polygon<f64> {
        &self.shape
    }

    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// Strict containment: points on a ring's boundary are outside.
    pub fn contains(&self, point: LonLat) -> bool {
        self.shape.contains(&Point::from(point))
    }

    /// Area-weighted centroid; rings enclosing no area fall back to the
    /// centroid of their outline.
    pub fn centroid(&self) -> LonLat {
        self.shape
            .centroid()
            .map(LonLat::from)
            .unwrap_or_else(|| self.bounds.center().into())
    }
}

fn validate_ring(ring: &[LonLat]) -> Result<(), GeometryError> {
    ensure_finite(ring)?;
    let found = distinct_count(ring);
    if found < 3 {
        return Err(GeometryError::TooFewVertices {
            kind: "polygon ring",
            required: 3,
            found,
        });
    }
    if ring.first() != ring.last() {
        return Err(GeometryError::UnclosedRing);
    }
    Ok(())
}

fn ring_to_geo(ring: Vec<LonLat>) -> LineString<f64> {
    ring.into_iter().map(Coord::from).collect()
}

impl TryFrom<PolygonGeometry> for Polygon {
    type Error = GeometryError;

    fn try_from(geometry: PolygonGeometry) -> Result<Self, GeometryError> {
        let mut rings = geometry.coordinates.into_iter();
        let exterior = rings.next().unwrap_or_default();
        validate_ring(&exterior)?;
        let interiors = rings
            .map(|ring| validate_ring(&ring).map(|()| ring_to_geo(ring)))
            .collect::<Result<Vec<_>, GeometryError>>()?;

        let shape = geo::Polygon::new(ring_to_geo(exterior), interiors);
        let bounds = shape.bounding_rect().ok_or(GeometryError::TooFewVertices {
            kind: "polygon ring",
            required: 3,
            found: 0,
        })?;
        Ok(Self { shape, bounds })
    }
}

impl From<Polygon> for PolygonGeometry {
    fn from(polygon: Polygon) -> Self {
        let (exterior, interiors) = polygon.shape.into_inner();
        let coordinates = std::iter::once(exterior)
            .chain(interiors)
            .map(|ring| ring.into_iter().map(LonLat::from).collect())
            .collect();
        Self { coordinates }
    }
}

/// Closed square ring of half-width `half` degrees around `center`.
pub fn square_ring(center: LonLat, half: f64) -> Vec<LonLat> {
    vec![
        LonLat::new(center.lon - half, center.lat - half),
        LonLat::new(center.lon + half, center.lat - half),
        LonLat::new(center.lon + half, center.lat + half),
        LonLat::new(center.lon - half, center.lat + half),
        LonLat::new(center.lon - half, center.lat - half),
    ]
}
