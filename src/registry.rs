//! Blockade store and the inverted cell index.

use std::collections::{BTreeSet, HashMap, HashSet};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::cell::{Cell, FINE_PRECISION};
use crate::coverage;
use crate::error::GeometryError;
use crate::geometry::Polygon;

pub type BlockadeId = String;

/// Free-form blockade properties, e.g. `{"reason": "construction"}`.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A closed or obstructed area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blockade {
    pub id: BlockadeId,
    pub polygon: Polygon,
    pub metadata: Metadata,
}

impl Blockade {
    pub fn new(id: impl Into<BlockadeId>, polygon: Polygon, metadata: Metadata) -> Self {
        Self {
            id: id.into(),
            polygon,
            metadata,
        }
    }
}

/// Registered blockades plus the `cell -> ids` index used for collision lookups.
///
/// Blockades are immutable once registered and are never removed, so the
/// index only grows. Both maps are updated together in [`Self::register`].
#[derive(Debug, Default)]
pub struct BlockadeRegistry {
    store: Vec<Blockade>,
    positions: HashMap<BlockadeId, usize>,
    cell_index: HashMap<Cell, HashSet<BlockadeId>>,
}

impl BlockadeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a blockade. Returns `Ok(false)` without touching any state
    /// when the id is already registered, even if the geometry differs.
    pub fn register(&mut self, blockade: Blockade) -> Result<bool, GeometryError> {
        if self.positions.contains_key(&blockade.id) {
            debug!(id = %blockade.id, "blockade already registered");
            return Ok(false);
        }
        let cells = coverage::polygon_to_cells(&blockade.polygon, FINE_PRECISION)?;
        self.insert(blockade, cells);
        Ok(true)
    }

    /// Registers a batch, rasterizing new polygons in parallel.
    ///
    /// Ids already registered, and repeats of an id within the batch after
    /// its first occurrence, are skipped before any work is done, exactly as
    /// sequential [`Self::register`] calls would skip them. Coverage of every
    /// remaining blockade is computed before anything is inserted, so a
    /// failure leaves the registry untouched. Returns the number added.
    pub fn register_many(&mut self, batch: Vec<Blockade>) -> Result<usize, GeometryError> {
        let mut seen = HashSet::new();
        let fresh: Vec<Blockade> = batch
            .into_iter()
            .filter(|b| !self.positions.contains_key(&b.id) && seen.insert(b.id.clone()))
            .collect();

        let covered = fresh
            .into_par_iter()
            .map(|b| coverage::polygon_to_cells(&b.polygon, FINE_PRECISION).map(|cells| (b, cells)))
            .collect::<Result<Vec<_>, GeometryError>>()?;

        let added = covered.len();
        for (blockade, cells) in covered {
            self.insert(blockade, cells);
        }
        Ok(added)
    }

    fn insert(&mut self, blockade: Blockade, cells: HashSet<Cell>) {
        info!(id = %blockade.id, cells = cells.len(), "registered blockade");
        for cell in cells {
            self.cell_index
                .entry(cell)
                .or_default()
                .insert(blockade.id.clone());
        }
        self.positions.insert(blockade.id.clone(), self.store.len());
        self.store.push(blockade);
    }

    pub fn get(&self, id: &str) -> Option<&Blockade> {
        self.positions.get(id).map(|&i| &self.store[i])
    }

    /// Looks up an id that came out of the cell index.
    ///
    /// # Panics
    ///
    /// Panics if the id is not registered, which means the index is corrupt.
    pub fn indexed(&self, id: &str) -> &Blockade {
        self.get(id)
            .unwrap_or_else(|| panic!("cell index references unregistered blockade {id:?}"))
    }

    /// All blockades in registration order.
    pub fn list(&self) -> &[Blockade] {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of distinct cells that hold at least one blockade.
    pub fn indexed_cells(&self) -> usize {
        self.cell_index.len()
    }

    /// Union of the ids indexed under any of `cells`.
    pub fn candidates<'a>(&self, cells: impl IntoIterator<Item = &'a Cell>) -> BTreeSet<BlockadeId> {
        cells
            .into_iter()
            .filter_map(|cell| self.cell_index.get(cell))
            .flatten()
            .cloned()
            .collect()
    }
}
