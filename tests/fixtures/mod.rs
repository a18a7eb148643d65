//! Test fixtures for blockade-detour.
//!
//! Provides:
//! - Real Karachi locations (around the demo blockades)
//! - Route builders and routing-engine doubles

pub mod karachi_locations;

pub use karachi_locations::*;
