//! Engine configuration and environment loading.

use std::time::Duration;

use tracing::warn;

use crate::osrm::OsrmConfig;

pub const OSRM_URL_ENV: &str = "OSRM_URL";
pub const OSRM_PROFILE_ENV: &str = "OSRM_PROFILE";
pub const CACHE_TTL_ENV: &str = "DETOUR_CACHE_TTL_SECS";
pub const CACHE_MAX_ENTRIES_ENV: &str = "DETOUR_CACHE_MAX_ENTRIES";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub osrm: OsrmConfig,
    /// Lifetime of a cached detour.
    pub cache_ttl_secs: u64,
    /// Upper bound on cached detours before expired entries are swept.
    pub cache_max_entries: usize,
    /// How far north of a blockade's top edge the bypass waypoint sits, in degrees.
    pub detour_margin_deg: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            osrm: OsrmConfig::default(),
            cache_ttl_secs: 300,
            cache_max_entries: 10_000,
            detour_margin_deg: 0.02,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, falling back to defaults for missing or
    /// unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(OSRM_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.osrm.base_url = url.trim().to_string();
        }
        if let Some(profile) = lookup(OSRM_PROFILE_ENV).filter(|v| !v.trim().is_empty()) {
            config.osrm.profile = profile.trim().to_string();
        }
        if let Some(ttl) = parse_var(&lookup, CACHE_TTL_ENV) {
            config.cache_ttl_secs = ttl;
        }
        if let Some(max) = parse_var(&lookup, CACHE_MAX_ENTRIES_ENV) {
            config.cache_max_entries = max;
        }
        config
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}
