//! Route vs. blockade collision detection.

use std::collections::BTreeSet;

use sha2::{Digest, Sha256};

use crate::cell::FINE_PRECISION;
use crate::coverage;
use crate::error::GeometryError;
use crate::geometry::Polyline;
use crate::registry::{BlockadeId, BlockadeRegistry};

/// Blockades a route passes through.
///
/// A blockade collides when any of its covering cells is also a cell the
/// densified route visits. This is a conservative approximation, not exact
/// geometric intersection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Collision {
    pub ids: BTreeSet<BlockadeId>,
    pub signature: String,
}

impl Collision {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The blockade used to plan a detour: the lowest id in sorted order.
    pub fn primary(&self) -> Option<&BlockadeId> {
        self.ids.first()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

pub fn detect(registry: &BlockadeRegistry, route: &Polyline) -> Result<Collision, GeometryError> {
    let cells = coverage::line_to_cells(route, FINE_PRECISION)?;
    let ids = registry.candidates(&cells);
    let signature = signature(&ids);
    Ok(Collision { ids, signature })
}

/// Hex SHA-256 over the sorted ids, or `""` for an empty set.
///
/// Each id is followed by a NUL byte so that distinct sets never hash the
/// same input bytes.
pub fn signature(ids: &BTreeSet<BlockadeId>) -> String {
    if ids.is_empty() {
        return String::new();
    }
    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}
