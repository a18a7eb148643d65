//! Geohash cell codec.
//!
//! Every spatial structure in the crate is keyed by geohash cells. Two
//! precisions are used: [`COARSE_PRECISION`] bins route endpoints for the
//! result cache, [`FINE_PRECISION`] rasterizes blockades and routes.

use std::fmt;

use geo::{Rect, coord};
use serde::Serialize;

use crate::error::GeometryError;
use crate::geometry::LonLat;

/// Roughly 1.2 km x 0.6 km cells; route origin/destination binning.
pub const COARSE_PRECISION: usize = 6;

/// Roughly 150 m x 150 m cells; blockade and route sampling.
pub const FINE_PRECISION: usize = 7;

/// Longest geohash produced by [`encode`].
pub const MAX_PRECISION: usize = 12;

/// A geohash cell token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Cell(String);

impl Cell {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn precision(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encodes a position into the cell containing it.
///
/// Out-of-range coordinates are clamped to the valid range and `precision`
/// is clamped to `1..=MAX_PRECISION`. Only non-finite input is rejected.
pub fn encode(lat: f64, lon: f64, precision: usize) -> Result<Cell, GeometryError> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(GeometryError::NonFiniteCoordinate);
    }
    let position = coord! {
        x: lon.clamp(-180.0, 180.0),
        y: lat.clamp(-90.0, 90.0),
    };
    geohash::encode(position, precision.clamp(1, MAX_PRECISION))
        .map(Cell)
        .map_err(|err| GeometryError::InvalidCell(err.to_string()))
}

/// Convenience wrapper taking a (lon, lat) point.
pub fn encode_point(point: LonLat, precision: usize) -> Result<Cell, GeometryError> {
    encode(point.lat, point.lon, precision)
}

/// Angular `(lat_step, lon_step)` of a cell at `precision`, in degrees.
///
/// Longitude takes the extra bit when `5 * precision` is odd.
pub fn cell_size(precision: usize) -> (f64, f64) {
    let bits = 5 * precision.clamp(1, MAX_PRECISION) as i32;
    let lon_bits = (bits + 1) / 2;
    let lat_bits = bits / 2;
    (180.0 / 2f64.powi(lat_bits), 360.0 / 2f64.powi(lon_bits))
}

/// Bounds of the area covered by a geohash string.
pub fn decode_bounds(hash: &str) -> Result<Rect<f64>, GeometryError> {
    geohash::decode_bbox(hash).map_err(|err| GeometryError::InvalidCell(err.to_string()))
}

/// Center point of a geohash string.
pub fn decode_center(hash: &str) -> Result<LonLat, GeometryError> {
    decode_bounds(hash).map(|bounds| bounds.center().into())
}
