//! The route adjustment engine.
//!
//! [`DetourEngine`] owns the blockade registry, the detour cache and the
//! routing engine. Construct one per process and share it by reference (or
//! `Arc`) across request handlers.
//!
//! Locking discipline:
//! - registration takes the registry write lock; detection takes the read lock,
//! - the cache mutex is held only for a lookup or a store,
//! - no lock is held while the routing engine is called.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, ResultCache};
use crate::collision::{self, Collision};
use crate::config::EngineConfig;
use crate::detour;
use crate::error::{AdjustError, GeometryError};
use crate::geometry::{LonLat, Polygon, Polyline};
use crate::registry::{Blockade, BlockadeId, BlockadeRegistry, Metadata};
use crate::traits::RouteEngine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustRequest {
    pub route: Polyline,
    /// Overrides the route's first vertex as the trip origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_hint: Option<LonLat>,
    /// Overrides the route's last vertex as the trip destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_hint: Option<LonLat>,
    /// Free-text report of the obstruction. Not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AdjustRequest {
    pub fn new(route: Polyline) -> Self {
        Self {
            route,
            origin_hint: None,
            destination_hint: None,
            description: None,
        }
    }

    fn endpoints(&self) -> Result<(LonLat, LonLat), GeometryError> {
        let too_few = || GeometryError::TooFewVertices {
            kind: "route",
            required: 2,
            found: 0,
        };
        let start = self.origin_hint.or(self.route.first()).ok_or_else(too_few)?;
        let end = self.destination_hint.or(self.route.last()).ok_or_else(too_few)?;
        if !start.is_finite() || !end.is_finite() {
            return Err(GeometryError::NonFiniteCoordinate);
        }
        Ok((start, end))
    }
}

/// A blockade as reported back to callers: a GeoJSON feature whose
/// properties carry the blockade metadata plus a `collided` flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockadeFeature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub id: BlockadeId,
    pub properties: Metadata,
    pub geometry: Polygon,
    #[serde(skip)]
    pub collided: bool,
}

impl BlockadeFeature {
    fn new(blockade: &Blockade, collided: bool) -> Self {
        let mut properties = blockade.metadata.clone();
        properties.insert("collided".to_string(), collided.into());
        Self {
            kind: "Feature",
            id: blockade.id.clone(),
            properties,
            geometry: blockade.polygon.clone(),
            collided,
        }
    }
}

/// How an adjustment was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustOutcome {
    /// No collision; the input route is returned as-is.
    Clear,
    /// A previously computed detour was served from the cache.
    CacheHit,
    /// A fresh detour was computed by the routing engine.
    Rerouted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustResponse {
    pub route: Polyline,
    pub blockades: Vec<BlockadeFeature>,
    pub collision_signature: String,
    #[serde(skip)]
    pub outcome: AdjustOutcome,
}

pub struct DetourEngine<R> {
    registry: RwLock<BlockadeRegistry>,
    cache: ResultCache,
    router: R,
    detour_margin_deg: f64,
}

impl<R: RouteEngine> DetourEngine<R> {
    pub fn new(router: R, config: &EngineConfig) -> Self {
        Self {
            registry: RwLock::new(BlockadeRegistry::new()),
            cache: ResultCache::new(config.cache_ttl(), config.cache_max_entries),
            router,
            detour_margin_deg: config.detour_margin_deg,
        }
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    fn read_registry(&self) -> RwLockReadGuard<'_, BlockadeRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, BlockadeRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a blockade; a no-op returning `Ok(false)` for a known id.
    pub fn register_blockade(
        &self,
        id: impl Into<BlockadeId>,
        polygon: Polygon,
        metadata: Metadata,
    ) -> Result<bool, GeometryError> {
        self.write_registry()
            .register(Blockade::new(id, polygon, metadata))
    }

    pub fn register_blockades(&self, batch: Vec<Blockade>) -> Result<usize, GeometryError> {
        self.write_registry().register_many(batch)
    }

    /// Snapshot of all registered blockades in registration order.
    pub fn blockades(&self) -> Vec<Blockade> {
        self.read_registry().list().to_vec()
    }

    pub fn detect(&self, route: &Polyline) -> Result<Collision, GeometryError> {
        route.validate()?;
        collision::detect(&self.read_registry(), route)
    }

    /// Returns the route to drive given the current blockades.
    ///
    /// A route that touches no blockade is returned unchanged. Otherwise the
    /// detour for (origin bin, destination bin, collision signature) is served
    /// from the cache or computed around the lowest-id colliding blockade.
    /// Routing failures are returned and never cached.
    pub fn adjust(&self, request: &AdjustRequest) -> Result<AdjustResponse, AdjustError> {
        request.route.validate()?;
        let (start, end) = request.endpoints()?;
        if let Some(description) = &request.description {
            debug!(%description, "description supplied; free-text interpretation is disabled");
        }

        let (collision, blockades, primary) = {
            let registry = self.read_registry();
            let collision = collision::detect(&registry, &request.route)?;
            let blockades = registry
                .list()
                .iter()
                .map(|b| BlockadeFeature::new(b, collision.contains(&b.id)))
                .collect::<Vec<_>>();
            let primary = collision.primary().map(|id| registry.indexed(id).clone());
            (collision, blockades, primary)
        };

        let respond = |route: Polyline, outcome: AdjustOutcome| AdjustResponse {
            route,
            blockades,
            collision_signature: collision.signature.clone(),
            outcome,
        };

        let Some(primary) = primary else {
            debug!("route is clear of blockades");
            return Ok(respond(request.route.clone(), AdjustOutcome::Clear));
        };

        let key = CacheKey::new(start, end, collision.signature.as_str())?;
        if let Some(route) = self.cache.get(&key) {
            info!(signature = %collision.signature, "serving cached detour");
            return Ok(respond(route, AdjustOutcome::CacheHit));
        }

        info!(
            collided = collision.ids.len(),
            around = %primary.id,
            "computing detour"
        );
        let route = detour::plan_detour(&self.router, start, end, &primary, self.detour_margin_deg)
            .inspect_err(|err| warn!(error = %err, "detour routing failed"))?;
        self.cache.put(key, route.clone());
        Ok(respond(route, AdjustOutcome::Rerouted))
    }

    /// Plain origin-to-destination route, ignoring blockades.
    pub fn plan_route(&self, start: LonLat, end: LonLat) -> Result<Polyline, AdjustError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(GeometryError::NonFiniteCoordinate.into());
        }
        Ok(self.router.compute_route(&[start, end])?)
    }
}
