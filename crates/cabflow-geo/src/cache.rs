//! Injectable zone-lookup cache.
//!
//! The production default is [`NoopZoneCache`]: every normalization
//! re-resolves the zone so dispatch-zone changes are never served stale.
//! [`TtlZoneCache`] is available for deployments that prefer fewer lookups.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::types::Zone;

/// Cache seam for zone lookups, keyed by address text.
pub trait ZoneCache: Send + Sync {
    fn get(&self, address: &str) -> Option<Zone>;
    fn put(&self, address: &str, zone: &Zone);
}

/// Caches nothing; every lookup goes to the collaborator.
#[derive(Debug, Default)]
pub struct NoopZoneCache;

impl ZoneCache for NoopZoneCache {
    fn get(&self, _address: &str) -> Option<Zone> {
        None
    }

    fn put(&self, _address: &str, _zone: &Zone) {}
}

/// In-memory cache with a fixed time-to-live per entry.
#[derive(Debug)]
pub struct TtlZoneCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Zone)>>,
}

impl TtlZoneCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl ZoneCache for TtlZoneCache {
    fn get(&self, address: &str) -> Option<Zone> {
        let entries = self.entries.lock().ok()?;
        let (stored_at, zone) = entries.get(address)?;
        if stored_at.elapsed() < self.ttl {
            Some(zone.clone())
        } else {
            None
        }
    }

    fn put(&self, address: &str, zone: &Zone) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(address.to_owned(), (Instant::now(), zone.clone()));
        }
    }
}
