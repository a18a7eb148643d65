//! Error types shared across the detour engine.

use thiserror::Error;

/// Rejected input geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{kind} needs at least {required} distinct vertices, found {found}")]
    TooFewVertices {
        kind: &'static str,
        required: usize,
        found: usize,
    },

    #[error("polygon ring is not closed (first vertex differs from last)")]
    UnclosedRing,

    #[error("coordinate is not a finite number")]
    NonFiniteCoordinate,

    #[error("polygon spans {samples} lattice samples, more than the {limit} allowed")]
    AreaTooLarge { samples: u64, limit: u64 },

    #[error("invalid geohash: {0}")]
    InvalidCell(String),
}

/// Failure talking to the external routing engine.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("routing engine request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("routing engine returned {code}: {message}")]
    Engine { code: String, message: String },

    #[error("routing engine returned no route")]
    NoRoute,
}

/// Failure of a route adjustment request.
#[derive(Debug, Error)]
pub enum AdjustError {
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("routing unavailable: {0}")]
    Routing(#[from] RoutingError),
}
