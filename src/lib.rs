//! blockade-detour core
//!
//! Geospatial blockade index, route collision detection and cached detour
//! planning on top of an external routing engine.

pub mod cache;
pub mod cell;
pub mod collision;
pub mod config;
pub mod coverage;
pub mod demo;
pub mod detour;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod osrm;
pub mod osrm_data;
pub mod registry;
pub mod traits;

pub use engine::{AdjustOutcome, AdjustRequest, AdjustResponse, BlockadeFeature, DetourEngine};
pub use error::{AdjustError, GeometryError, RoutingError};
pub use geometry::{LonLat, Polygon, Polyline};
