//! Seams to the outside world.
//!
//! The detour engine never computes drivable paths itself. Concrete routers
//! (OSRM over HTTP, or an in-process stand-in for tests and offline runs)
//! implement [`RouteEngine`].

use crate::error::RoutingError;
use crate::geometry::{LonLat, Polyline};

/// Computes a drivable path through an ordered list of waypoints.
pub trait RouteEngine {
    /// Returns the route geometry visiting `waypoints` in order.
    ///
    /// Failures (unreachable engine, timeouts, no route) are returned as
    /// errors and must not be papered over with a fallback geometry.
    fn compute_route(&self, waypoints: &[LonLat]) -> Result<Polyline, RoutingError>;
}

impl<T: RouteEngine + ?Sized> RouteEngine for &T {
    fn compute_route(&self, waypoints: &[LonLat]) -> Result<Polyline, RoutingError> {
        (**self).compute_route(waypoints)
    }
}

/// Joins the waypoints with straight segments.
///
/// Useful when no routing engine is reachable and a rough geometry is good
/// enough, e.g. local demos.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineEngine;

impl RouteEngine for StraightLineEngine {
    fn compute_route(&self, waypoints: &[LonLat]) -> Result<Polyline, RoutingError> {
        if waypoints.len() < 2 {
            return Err(RoutingError::NoRoute);
        }
        Ok(Polyline::new(waypoints.to_vec()))
    }
}
