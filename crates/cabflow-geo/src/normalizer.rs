//! Total address normalization.
//!
//! [`AddressNormalizer::normalize`] turns free text into a
//! [`ResolvedAddress`] and never fails: a dead geocoder yields the fallback
//! centre coordinate, a dead zone lookup yields the fallback zone. Each call
//! re-resolves by default (see [`crate::NoopZoneCache`]) so zone data is
//! never stale.

use std::collections::HashMap;

use async_trait::async_trait;
use cabflow_core::{ExtractedJob, StopKey};
use futures::future::join_all;

use crate::address::parse_address;
use crate::cache::{NoopZoneCache, ZoneCache};
use crate::geocoder::Geocoder;
use crate::landmarks::LandmarkTable;
use crate::types::{LatLng, ResolvedAddress, Zone};
use crate::GeoError;

/// Coordinate used when geocoding fails or returns nothing (fallback centre).
pub const FALLBACK_CENTRE: LatLng = LatLng {
    lat: 51.7356,
    lng: 0.4685,
};

/// Descriptor of the fallback dispatch zone.
pub const DEFAULT_ZONE_DESCRIPTOR: &str = "TOWN";

/// The zone used when the booking system cannot place an address.
#[must_use]
pub fn fallback_zone() -> Zone {
    Zone {
        id: 1,
        name: "Town Centre".to_owned(),
        descriptor: DEFAULT_ZONE_DESCRIPTOR.to_owned(),
    }
}

/// Resolves an address string to the external system's dispatch zone.
#[async_trait]
pub trait ZoneLookup: Send + Sync {
    /// Returns `Ok(None)` when the external system has no zone for the address.
    async fn lookup_zone(&self, address: &str) -> Result<Option<Zone>, GeoError>;
}

static NOOP_CACHE: NoopZoneCache = NoopZoneCache;

/// Normalizes free-text addresses through injected collaborators.
pub struct AddressNormalizer<'a> {
    geocoder: &'a dyn Geocoder,
    zones: &'a dyn ZoneLookup,
    cache: &'a dyn ZoneCache,
    landmarks: LandmarkTable,
}

impl<'a> AddressNormalizer<'a> {
    /// Builds a normalizer with the built-in landmark table and no caching.
    pub fn new(geocoder: &'a dyn Geocoder, zones: &'a dyn ZoneLookup) -> Self {
        Self {
            geocoder,
            zones,
            cache: &NOOP_CACHE,
            landmarks: LandmarkTable::builtin(),
        }
    }

    /// Replaces the zone cache.
    #[must_use]
    pub fn with_cache(mut self, cache: &'a dyn ZoneCache) -> Self {
        self.cache = cache;
        self
    }

    /// Replaces the landmark rewrite table.
    #[must_use]
    pub fn with_landmarks(mut self, landmarks: LandmarkTable) -> Self {
        self.landmarks = landmarks;
        self
    }

    /// Normalizes one address. Total: always returns a coordinate and a zone.
    pub async fn normalize(&self, raw: &str) -> ResolvedAddress {
        let trimmed = raw.trim();
        let text = match self.landmarks.rewrite(trimmed) {
            Some(canonical) => {
                tracing::debug!(input = trimmed, canonical, "landmark rewrite");
                canonical.to_owned()
            }
            None => trimmed.to_owned(),
        };

        let parsed = parse_address(&text);
        let (coordinate, zone) =
            futures::join!(self.resolve_coordinate(&text), self.resolve_zone(&text));

        ResolvedAddress {
            text,
            house: parsed.house,
            street: parsed.street,
            town: parsed.town,
            postcode: parsed.postcode,
            coordinate,
            zone,
        }
    }

    /// Normalizes several addresses concurrently, preserving input order.
    pub async fn normalize_all(&self, addresses: &[&str]) -> Vec<ResolvedAddress> {
        join_all(addresses.iter().map(|raw| self.normalize(raw))).await
    }

    /// Resolves every populated stop of a job concurrently.
    pub async fn normalize_stops(&self, job: &ExtractedJob) -> HashMap<StopKey, ResolvedAddress> {
        let stops: Vec<(StopKey, &str)> = StopKey::VISIT_ORDER
            .iter()
            .filter_map(|&key| job.address(key).map(|addr| (key, addr)))
            .collect();
        let resolved = join_all(stops.iter().map(|(_, addr)| self.normalize(addr))).await;
        stops
            .into_iter()
            .map(|(key, _)| key)
            .zip(resolved)
            .collect()
    }

    async fn resolve_coordinate(&self, text: &str) -> LatLng {
        match self.geocoder.geocode(text).await {
            Ok(Some(coordinate)) => coordinate,
            Ok(None) => {
                tracing::warn!(address = text, "geocoder found nothing, using fallback centre");
                FALLBACK_CENTRE
            }
            Err(err) => {
                tracing::warn!(
                    address = text,
                    error = %err,
                    "geocoding failed, using fallback centre"
                );
                FALLBACK_CENTRE
            }
        }
    }

    async fn resolve_zone(&self, text: &str) -> Zone {
        if let Some(zone) = self.cache.get(text) {
            return zone;
        }
        match self.zones.lookup_zone(text).await {
            Ok(Some(zone)) => {
                self.cache.put(text, &zone);
                zone
            }
            Ok(None) => {
                tracing::warn!(address = text, "no zone for address, using fallback zone");
                fallback_zone()
            }
            Err(err) => {
                tracing::warn!(
                    address = text,
                    error = %err,
                    "zone lookup failed, using fallback zone"
                );
                fallback_zone()
            }
        }
    }
}
