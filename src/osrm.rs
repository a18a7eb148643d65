//! OSRM HTTP adapter for route geometries.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RoutingError;
use crate::geometry::{LonLat, Polyline};
use crate::traits::RouteEngine;

#[derive(Debug, Clone, PartialEq)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "driving".to_string(),
            connect_timeout_secs: 5,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OsrmConfig {
        &self.config
    }

    fn route_url(&self, waypoints: &[LonLat]) -> String {
        let coords = waypoints
            .iter()
            .map(|p| format!("{:.6},{:.6}", p.lon, p.lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            coords
        )
    }
}

impl RouteEngine for OsrmClient {
    fn compute_route(&self, waypoints: &[LonLat]) -> Result<Polyline, RoutingError> {
        if waypoints.len() < 2 {
            return Err(RoutingError::NoRoute);
        }

        let url = self.route_url(waypoints);
        debug!(%url, "requesting OSRM route");

        let response = self.client.get(url).send().inspect_err(|err| {
            warn!(error = %err, "OSRM request failed");
        })?;
        let status = response.status();

        // OSRM reports routing failures as JSON bodies with a non-"Ok" code,
        // usually alongside a 400 status.
        match response.json::<OsrmRouteResponse>() {
            Ok(body) => body.into_geometry(),
            Err(err) if status.is_success() => Err(err.into()),
            Err(_) => Err(RoutingError::Engine {
                code: status.as_u16().to_string(),
                message: status.canonical_reason().unwrap_or("unexpected status").to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: Polyline,
}

impl OsrmRouteResponse {
    fn into_geometry(self) -> Result<Polyline, RoutingError> {
        if self.code != "Ok" {
            return Err(RoutingError::Engine {
                code: self.code,
                message: self.message.unwrap_or_default(),
            });
        }
        self.routes
            .into_iter()
            .next()
            .map(|route| route.geometry)
            .ok_or(RoutingError::NoRoute)
    }
}
