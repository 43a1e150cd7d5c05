//! Resolved-address types shared with the booking submission payload.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A dispatch zone attached to an address by the external booking system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: i64,
    pub name: String,
    pub descriptor: String,
}

/// A fully resolved address: parsed components, coordinate, and zone.
///
/// Built once per distinct address string; request-scoped and never persisted
/// by this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAddress {
    /// The full (possibly landmark-rewritten) address text.
    pub text: String,
    pub house: String,
    pub street: String,
    pub town: String,
    pub postcode: String,
    pub coordinate: LatLng,
    pub zone: Zone,
}
