//! Time-bounded memo of computed detours.
//!
//! Entries expire lazily: an entry past its deadline is reported as a miss on
//! read and left in place until it is overwritten or swept. Sweeping only
//! happens when an insert would push the cache past its capacity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cell::{self, COARSE_PRECISION, Cell};
use crate::error::GeometryError;
use crate::geometry::{LonLat, Polyline};

const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

/// Origin bin, destination bin and collision signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub origin: Cell,
    pub destination: Cell,
    pub signature: String,
}

impl CacheKey {
    /// Bins both endpoints at coarse precision so nearby trips share entries.
    pub fn new(
        origin: LonLat,
        destination: LonLat,
        signature: impl Into<String>,
    ) -> Result<Self, GeometryError> {
        Ok(Self {
            origin: cell::encode_point(origin, COARSE_PRECISION)?,
            destination: cell::encode_point(destination, COARSE_PRECISION)?,
            signature: signature.into(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub route: Polyline,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug)]
pub struct ResultCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: ttl.min(MAX_TTL),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Polyline> {
        self.get_at(key, Instant::now())
    }

    /// Lookup as of `now`; expired entries count as misses.
    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<Polyline> {
        let route = self
            .lock()
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.route.clone());
        let counter = if route.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        route
    }

    pub fn put(&self, key: CacheKey, route: Polyline) {
        self.put_at(key, route, Instant::now());
    }

    /// Stores `route` with a deadline of `now + ttl`, replacing any entry for `key`.
    pub fn put_at(&self, key: CacheKey, route: Polyline, now: Instant) {
        let expires_at = now + self.ttl;
        let mut entries = self.lock();
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let before = entries.len();
            entries.retain(|_, entry| entry.is_live(now));
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
            debug!(evicted = before - entries.len(), "cache at capacity");
        }
        entries.insert(key, CacheEntry { route, expires_at });
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
