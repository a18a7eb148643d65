//! Karachi locations and routing doubles for integration tests.
//!
//! The demo blockades sit around (67.1000, 24.8770); routes below are chosen
//! relative to them.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use blockade_detour::geometry::square_ring;
use blockade_detour::registry::{Blockade, Metadata};
use blockade_detour::traits::RouteEngine;
use blockade_detour::{LonLat, Polygon, Polyline, RoutingError};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lon: f64,
    pub lat: f64,
}

impl Location {
    pub const fn new(name: &'static str, lon: f64, lat: f64) -> Self {
        Self { name, lon, lat }
    }

    pub fn point(&self) -> LonLat {
        LonLat::new(self.lon, self.lat)
    }
}

// ============================================================================
// Landmarks
// ============================================================================

pub const EXPO_CENTRE: Location = Location::new("Expo Centre", 67.05824, 24.89651);
pub const MAZAR_E_QUAID: Location = Location::new("Mazar-e-Quaid", 67.04114, 24.87335);

// ============================================================================
// Routes
// ============================================================================

/// Diagonal through the center demo blockade, north-west to south-east.
pub fn route_through_center() -> Polyline {
    Polyline::new(vec![LonLat::new(67.0900, 24.8970), LonLat::new(67.1100, 24.8570)])
}

/// Same trip with slightly different endpoints and an extra vertex; shares
/// the coarse endpoint bins and the collision set of [`route_through_center`].
pub fn nearby_route_through_center() -> Polyline {
    Polyline::new(vec![
        LonLat::new(67.0905, 24.8965),
        LonLat::new(67.1005, 24.8770),
        LonLat::new(67.1095, 24.8575),
    ])
}

/// [`route_through_center`] shifted one degree north.
pub fn route_far_north() -> Polyline {
    Polyline::new(vec![LonLat::new(67.0900, 25.8970), LonLat::new(67.1100, 25.8570)])
}

/// East-west line through the west, center and east demo blockades.
pub fn route_across_row() -> Polyline {
    Polyline::new(vec![LonLat::new(67.0800, 24.8770), LonLat::new(67.1200, 24.8770)])
}

/// Expo Centre to Mazar-e-Quaid, clear of every demo blockade.
pub fn clear_route() -> Polyline {
    Polyline::new(vec![EXPO_CENTRE.point(), MAZAR_E_QUAID.point()])
}

// ============================================================================
// Blockades
// ============================================================================

pub fn square_blockade(id: &str, lon: f64, lat: f64, half: f64, reason: &str) -> Blockade {
    let mut metadata = Metadata::new();
    metadata.insert("reason".to_string(), reason.into());
    let polygon = Polygon::new(square_ring(LonLat::new(lon, lat), half)).expect("valid square");
    Blockade::new(id, polygon, metadata)
}

// ============================================================================
// Routing doubles
// ============================================================================

/// Returns the waypoints as the route and records every call.
#[derive(Debug, Default)]
pub struct CountingRouter {
    calls: AtomicUsize,
    last_waypoints: Mutex<Vec<LonLat>>,
}

impl CountingRouter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_waypoints(&self) -> Vec<LonLat> {
        self.last_waypoints.lock().unwrap().clone()
    }
}

impl RouteEngine for CountingRouter {
    fn compute_route(&self, waypoints: &[LonLat]) -> Result<Polyline, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_waypoints.lock().unwrap() = waypoints.to_vec();
        Ok(Polyline::new(waypoints.to_vec()))
    }
}

/// Always fails as if the engine were unreachable.
#[derive(Debug, Default)]
pub struct FailingRouter {
    calls: AtomicUsize,
}

impl FailingRouter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteEngine for FailingRouter {
    fn compute_route(&self, _waypoints: &[LonLat]) -> Result<Polyline, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RoutingError::Engine {
            code: "Unavailable".to_string(),
            message: "connection refused".to_string(),
        })
    }
}
