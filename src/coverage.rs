//! Approximate cell coverage of polygons and polylines.
//!
//! Coverage is computed by point sampling on a regular lattice rather than
//! exact rasterization. The error is bounded by one cell width.

use std::collections::HashSet;

use crate::cell::{self, Cell};
use crate::error::GeometryError;
use crate::geometry::{LonLat, Polygon, Polyline};

/// Maximum spacing between sampled route points, in degrees (~100 m).
pub const DENSIFY_STEP_DEG: f64 = 0.0009;

/// Upper bound on lattice samples per polygon. At fine precision this is a
/// box of roughly 150 km on a side.
pub const MAX_LATTICE_SAMPLES: u64 = 1_000_000;

/// Cells whose lattice sample falls strictly inside `polygon`.
///
/// The lattice starts at the bounding box's minimum corner and steps by the
/// cell size at `precision`. A polygon too small to contain any lattice point
/// is covered by the single cell holding its centroid, so the result is never
/// empty. Polygons needing more than [`MAX_LATTICE_SAMPLES`] samples are
/// rejected before any sampling happens.
pub fn polygon_to_cells(polygon: &Polygon, precision: usize) -> Result<HashSet<Cell>, GeometryError> {
    let (lat_step, lon_step) = cell::cell_size(precision);
    let bounds = polygon.bounds();
    let (min, max) = (bounds.min(), bounds.max());

    let rows = lattice_steps(min.y, max.y, lat_step);
    let cols = lattice_steps(min.x, max.x, lon_step);
    let samples = rows.saturating_mul(cols);
    if samples > MAX_LATTICE_SAMPLES {
        return Err(GeometryError::AreaTooLarge {
            samples,
            limit: MAX_LATTICE_SAMPLES,
        });
    }

    let mut cells = HashSet::new();
    for row in 0..rows {
        let lat = min.y + row as f64 * lat_step;
        for col in 0..cols {
            let sample = LonLat::new(min.x + col as f64 * lon_step, lat);
            if polygon.contains(sample) {
                cells.insert(cell::encode_point(sample, precision)?);
            }
        }
    }

    if cells.is_empty() {
        cells.insert(cell::encode_point(polygon.centroid(), precision)?);
    }
    Ok(cells)
}

/// Cells visited by `line` after densifying it to [`DENSIFY_STEP_DEG`].
pub fn line_to_cells(line: &Polyline, precision: usize) -> Result<HashSet<Cell>, GeometryError> {
    line.densify(DENSIFY_STEP_DEG)
        .into_iter()
        .map(|point| cell::encode_point(point, precision))
        .collect()
}

/// Number of lattice points `lo + k * step` with `k >= 0` that do not pass `hi`.
fn lattice_steps(lo: f64, hi: f64, step: f64) -> u64 {
    if !(hi >= lo) {
        return 0;
    }
    // Float-to-int casts saturate, so a huge span cannot wrap.
    ((hi - lo) / step).floor() as u64 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{FINE_PRECISION, decode_bounds};
    use crate::geometry::square_ring;

    fn square(lon: f64, lat: f64, half: f64) -> Polygon {
        Polygon::new(square_ring(LonLat::new(lon, lat), half)).unwrap()
    }

    #[test]
    fn test_tiny_polygon_maps_to_centroid_cell() {
        let polygon = square(67.1, 24.877, 0.0002);
        let cells = polygon_to_cells(&polygon, FINE_PRECISION).unwrap();
        assert_eq!(cells.len(), 1);
        let expected = cell::encode(24.877, 67.1, FINE_PRECISION).unwrap();
        assert!(cells.contains(&expected));
    }

    #[test]
    fn test_square_covers_its_center() {
        let polygon = square(67.1, 24.877, 0.0025);
        let cells = polygon_to_cells(&polygon, FINE_PRECISION).unwrap();
        assert!(cells.len() >= 4, "expected a block of cells, got {}", cells.len());
        assert!(cells.contains(&cell::encode(24.877, 67.1, FINE_PRECISION).unwrap()));
    }

    #[test]
    fn test_polygon_cells_stay_near_polygon() {
        let polygon = square(67.1, 24.877, 0.0025);
        let (lat_step, lon_step) = cell::cell_size(FINE_PRECISION);
        let bounds = polygon.bounds();
        for c in polygon_to_cells(&polygon, FINE_PRECISION).unwrap() {
            let cell_bounds = decode_bounds(c.as_str()).unwrap();
            assert!(cell_bounds.min().x >= bounds.min().x - lon_step);
            assert!(cell_bounds.max().x <= bounds.max().x + lon_step);
            assert!(cell_bounds.min().y >= bounds.min().y - lat_step);
            assert!(cell_bounds.max().y <= bounds.max().y + lat_step);
        }
    }

    #[test]
    fn test_oversized_polygon_is_rejected() {
        let world = square(0.0, 0.0, 80.0);
        assert!(matches!(
            polygon_to_cells(&world, FINE_PRECISION),
            Err(GeometryError::AreaTooLarge {
                limit: MAX_LATTICE_SAMPLES,
                ..
            })
        ));
        // The same area is fine at a coarse enough precision.
        assert!(polygon_to_cells(&world, 2).is_ok());
    }

    #[test]
    fn test_line_cells_are_contiguous() {
        let line = Polyline::new(vec![LonLat::new(67.09, 24.897), LonLat::new(67.11, 24.857)]);
        let cells = line_to_cells(&line, FINE_PRECISION).unwrap();
        let (lat_step, _) = cell::cell_size(FINE_PRECISION);
        // A 0.04 degree latitude span cannot be covered by fewer cells than rows.
        assert!(cells.len() as f64 >= 0.04 / lat_step);
        assert!(cells.contains(&cell::encode(24.897, 67.09, FINE_PRECISION).unwrap()));
        assert!(cells.contains(&cell::encode(24.857, 67.11, FINE_PRECISION).unwrap()));
    }

    #[test]
    fn test_line_with_nan_is_rejected() {
        let line = Polyline::new(vec![LonLat::new(67.09, f64::NAN), LonLat::new(67.11, 24.857)]);
        assert_eq!(
            line_to_cells(&line, FINE_PRECISION),
            Err(GeometryError::NonFiniteCoordinate)
        );
    }

    #[test]
    fn test_lattice_steps() {
        assert_eq!(lattice_steps(0.0, 1.0, 0.5), 3);
        assert_eq!(lattice_steps(0.0, 0.1, 0.5), 1);
        assert_eq!(lattice_steps(1.0, 0.0, 0.5), 0);
    }
}
