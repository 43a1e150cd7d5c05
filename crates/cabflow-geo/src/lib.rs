//! Address normalization for the cabflow booking pipeline.
//!
//! Parses free-text UK addresses into `{house, street, town, postcode}`,
//! rewrites well-known local landmarks to their canonical full addresses,
//! and resolves coordinates and dispatch zones through injected collaborators.
//! Resolution is total: collaborator failures fall back to documented
//! defaults and never surface as errors.

pub mod address;
pub mod cache;
pub mod error;
pub mod geocoder;
pub mod landmarks;
pub mod normalizer;
pub mod types;

pub use address::{parse_address, ParsedAddress};
pub use cache::{NoopZoneCache, TtlZoneCache, ZoneCache};
pub use error::GeoError;
pub use geocoder::{Geocoder, HttpGeocoder};
pub use landmarks::LandmarkTable;
pub use normalizer::{
    fallback_zone, AddressNormalizer, ZoneLookup, DEFAULT_ZONE_DESCRIPTOR, FALLBACK_CENTRE,
};
pub use types::{LatLng, ResolvedAddress, Zone};
