//! Demo blockades around central Karachi.
//!
//! Four 500 m squares: one at the center point and one 0.01 degrees to the
//! west, east and north of it.

use crate::error::GeometryError;
use crate::geometry::{LonLat, Polygon, square_ring};
use crate::registry::{Blockade, Metadata};

pub const DEMO_CENTER: LonLat = LonLat::new(67.1000, 24.8770);

/// Half-width of each demo square, in degrees.
pub const DEMO_HALF_WIDTH: f64 = 0.0025;

const DEMO_BLOCKADES: &[(&str, (f64, f64), &str)] = &[
    ("blk-west", (-0.01, 0.00), "west protest"),
    ("blk-center", (0.00, 0.00), "construction"),
    ("blk-east", (0.01, 0.00), "east flood"),
    ("blk-north", (0.00, 0.01), "accident"),
];

pub fn demo_blockades() -> Result<Vec<Blockade>, GeometryError> {
    DEMO_BLOCKADES
        .iter()
        .map(|&(id, (dlon, dlat), reason)| {
            let center = LonLat::new(DEMO_CENTER.lon + dlon, DEMO_CENTER.lat + dlat);
            let polygon = Polygon::new(square_ring(center, DEMO_HALF_WIDTH))?;
            let mut metadata = Metadata::new();
            metadata.insert("reason".to_string(), reason.into());
            Ok(Blockade::new(id, polygon, metadata))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_blockades_are_valid() {
        let blockades = demo_blockades().unwrap();
        let ids: Vec<&str> = blockades.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["blk-west", "blk-center", "blk-east", "blk-north"]);
        for b in &blockades {
            let center = b.polygon.centroid();
            assert!(b.polygon.contains(center), "{} does not contain its centroid", b.id);
        }
        assert_eq!(blockades[3].metadata["reason"], "accident");
    }
}
