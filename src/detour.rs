//! Single-waypoint bypass heuristic.
//!
//! The planner does not search for the best bypass. It sends the route over
//! the top of one blockade's bounding box and lets the routing engine find a
//! drivable path through that waypoint.

use tracing::debug;

use crate::error::RoutingError;
use crate::geometry::{LonLat, Polyline};
use crate::registry::Blockade;
use crate::traits::RouteEngine;

/// Horizontal midpoint of the blockade's bounds, `margin_deg` north of its top edge.
pub fn bypass_waypoint(blockade: &Blockade, margin_deg: f64) -> LonLat {
    let bounds = blockade.polygon.bounds();
    LonLat::new(bounds.center().x, (bounds.max().y + margin_deg).min(90.0))
}

pub fn plan_detour<R: RouteEngine>(
    router: &R,
    start: LonLat,
    end: LonLat,
    blockade: &Blockade,
    margin_deg: f64,
) -> Result<Polyline, RoutingError> {
    let waypoint = bypass_waypoint(blockade, margin_deg);
    debug!(blockade = %blockade.id, lon = waypoint.lon, lat = waypoint.lat, "planning detour");
    router.compute_route(&[start, waypoint, end])
}
