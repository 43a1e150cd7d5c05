//! Geocoding collaborator.
//!
//! [`Geocoder`] is the seam the normalizer calls through; [`HttpGeocoder`]
//! is the production implementation against a Google-style geocoding
//! endpoint. Tests inject fakes or point the HTTP client at a mock server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::types::LatLng;
use crate::GeoError;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Resolves an address string to a coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns `Ok(None)` when the address geocodes to nothing.
    async fn geocode(&self, address: &str) -> Result<Option<LatLng>, GeoError>;
}

/// HTTP geocoder against a Google-style `/maps/api/geocode/json` endpoint.
///
/// Use [`HttpGeocoder::new`] for production or
/// [`HttpGeocoder::with_base_url`] to point at a mock server in tests.
pub struct HttpGeocoder {
    client: Client,
    api_key: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

impl HttpGeocoder {
    /// Creates a geocoder pointed at the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, GeoError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a geocoder with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`GeoError::Api`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("cabflow/0.1 (booking-pipeline)")
            .build()?;
        let base_url = Url::parse(base_url)
            .map_err(|e| GeoError::Api(format!("invalid base URL '{base_url}': {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    fn geocode_url(&self, address: &str) -> Result<Url, GeoError> {
        let mut url = self
            .base_url
            .join("/maps/api/geocode/json")
            .map_err(|e| GeoError::Api(format!("invalid geocode path: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("address", address);
            pairs.append_pair("region", "uk");
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<LatLng>, GeoError> {
        let url = self.geocode_url(address)?;
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let parsed: GeocodeResponse =
            serde_json::from_str(&body).map_err(|e| GeoError::Deserialize {
                context: format!("geocode({address})"),
                source: e,
            })?;

        match parsed.status.as_str() {
            "OK" => Ok(parsed.results.into_iter().next().map(|r| r.geometry.location)),
            "ZERO_RESULTS" => Ok(None),
            other => Err(GeoError::Api(format!("geocode status {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocode_url_carries_address_region_and_key() {
        let geocoder =
            HttpGeocoder::with_base_url("test-key", 8, "https://maps.example.com").expect("builds");
        let url = geocoder.geocode_url("High Street, Chelmsford").expect("url");
        assert!(url.as_str().starts_with("https://maps.example.com/maps/api/geocode/json?"));
        assert!(url.as_str().contains("region=uk"));
        assert!(url.as_str().contains("key=test-key"));
    }
}
