//! HTTP client for the AUTOCAB booking REST API.
//!
//! Wraps `reqwest` with typed error handling, subscription-key auth, and
//! bounded retry on transient failures. 404 and 406 surface as
//! [`AutocabError::NotFound`] / [`AutocabError::Conflict`] so the submission
//! workflow can apply its bespoke policies.

use std::time::Duration;

use async_trait::async_trait;
use cabflow_geo::{GeoError, Zone, ZoneLookup};
use chrono::NaiveDate;
use reqwest::{Client, StatusCode, Url};

use crate::error::AutocabError;
use crate::retry::retry_with_backoff;
use crate::types::{
    Booking, BookingSubmission, CreatedBooking, SearchRequest, SearchResponse, ZoneRequest,
};

const DEFAULT_BASE_URL: &str = "https://autocab-api.azure-api.net";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Longest error-body excerpt carried on [`AutocabError::UnexpectedStatus`].
const MAX_ERROR_BODY: usize = 512;

/// Client for the AUTOCAB booking REST API.
///
/// Use [`AutocabClient::new`] for production or
/// [`AutocabClient::with_base_url`] to point at a mock server in tests.
pub struct AutocabClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl AutocabClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`AutocabError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, AutocabError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`AutocabError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`AutocabError::UnexpectedStatus`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, AutocabError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("cabflow/0.1 (booking-pipeline)")
            .build()?;

        // Normalise: the base URL must end with exactly one slash so that
        // Url::join treats it as a directory rather than a file.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| AutocabError::UnexpectedStatus {
            status: 0,
            body: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
            max_retries: 2,
            backoff_base_ms: 500,
        })
    }

    /// Overrides the retry policy (default: 2 retries, 500 ms base back-off).
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Searches bookings by caller reference within a date window.
    ///
    /// # Errors
    ///
    /// - [`AutocabError::Http`] on network failure.
    /// - [`AutocabError::UnexpectedStatus`] on a non-2xx response.
    /// - [`AutocabError::Deserialize`] if the response shape is unexpected.
    pub async fn search_by_reference(
        &self,
        reference: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Booking>, AutocabError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.search_by_reference_once(reference, from, to)
        })
        .await
    }

    async fn search_by_reference_once(
        &self,
        reference: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Booking>, AutocabError> {
        let url = self.url("booking/v1/search")?;
        let request = SearchRequest {
            from: from.format("%Y-%m-%dT00:00:00.000").to_string(),
            to: to.format("%Y-%m-%dT23:59:00.000").to_string(),
            your_reference: reference.to_owned(),
        };
        let response = self
            .client
            .post(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(unexpected(status, body));
        }
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| AutocabError::Deserialize {
                context: format!("searchByReference({reference})"),
                source: e,
            })?;
        Ok(parsed.bookings)
    }

    /// Fetches a booking by id.
    ///
    /// # Errors
    ///
    /// - [`AutocabError::NotFound`] on HTTP 404.
    /// - [`AutocabError::Http`] / [`AutocabError::UnexpectedStatus`] /
    ///   [`AutocabError::Deserialize`] as for the other endpoints.
    pub async fn get_booking(&self, booking_id: i64) -> Result<Booking, AutocabError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.get_booking_once(booking_id)
        })
        .await
    }

    async fn get_booking_once(&self, booking_id: i64) -> Result<Booking, AutocabError> {
        let url = self.url(&format!("booking/v1/booking/{booking_id}"))?;
        let response = self
            .client
            .get(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AutocabError::NotFound(booking_id));
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(unexpected(status, body));
        }
        serde_json::from_str(&body).map_err(|e| AutocabError::Deserialize {
            context: format!("getBooking({booking_id})"),
            source: e,
        })
    }

    /// Creates a booking and returns the new booking id.
    ///
    /// # Errors
    ///
    /// - [`AutocabError::Http`] on network failure.
    /// - [`AutocabError::UnexpectedStatus`] on a non-2xx response.
    /// - [`AutocabError::Deserialize`] if the response shape is unexpected.
    pub async fn create_booking(
        &self,
        submission: &BookingSubmission,
    ) -> Result<i64, AutocabError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.create_booking_once(submission)
        })
        .await
    }

    async fn create_booking_once(
        &self,
        submission: &BookingSubmission,
    ) -> Result<i64, AutocabError> {
        let url = self.url("booking/v1/booking")?;
        let response = self
            .client
            .post(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .json(submission)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(unexpected(status, body));
        }
        let created: CreatedBooking =
            serde_json::from_str(&body).map_err(|e| AutocabError::Deserialize {
                context: "createBooking".to_owned(),
                source: e,
            })?;
        Ok(created.booking_id)
    }

    /// Updates a booking in place.
    ///
    /// `override_conflict` adds the API's explicit override query parameter,
    /// used by the workflow for its single 406 retry.
    ///
    /// # Errors
    ///
    /// - [`AutocabError::NotFound`] on HTTP 404.
    /// - [`AutocabError::Conflict`] on HTTP 406.
    /// - [`AutocabError::Http`] / [`AutocabError::UnexpectedStatus`] otherwise.
    pub async fn update_booking(
        &self,
        booking_id: i64,
        submission: &BookingSubmission,
        override_conflict: bool,
    ) -> Result<(), AutocabError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.update_booking_once(booking_id, submission, override_conflict)
        })
        .await
    }

    async fn update_booking_once(
        &self,
        booking_id: i64,
        submission: &BookingSubmission,
        override_conflict: bool,
    ) -> Result<(), AutocabError> {
        let mut url = self.url(&format!("booking/v1/booking/{booking_id}"))?;
        if override_conflict {
            url.query_pairs_mut().append_pair("override", "true");
        }
        let response = self
            .client
            .put(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .json(submission)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AutocabError::NotFound(booking_id));
        }
        if status == StatusCode::NOT_ACCEPTABLE {
            return Err(AutocabError::Conflict(booking_id));
        }
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await?;
        Err(unexpected(status, body))
    }

    /// Cancels a booking.
    ///
    /// # Errors
    ///
    /// - [`AutocabError::NotFound`] on HTTP 404.
    /// - [`AutocabError::Http`] / [`AutocabError::UnexpectedStatus`] otherwise.
    pub async fn delete_booking(&self, booking_id: i64) -> Result<(), AutocabError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.delete_booking_once(booking_id)
        })
        .await
    }

    async fn delete_booking_once(&self, booking_id: i64) -> Result<(), AutocabError> {
        let url = self.url(&format!("booking/v1/booking/{booking_id}"))?;
        let response = self
            .client
            .delete(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AutocabError::NotFound(booking_id));
        }
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await?;
        Err(unexpected(status, body))
    }

    /// Resolves the dispatch zone for an address, `Ok(None)` when the system
    /// has no zone for it.
    ///
    /// # Errors
    ///
    /// - [`AutocabError::Http`] on network failure.
    /// - [`AutocabError::UnexpectedStatus`] on a non-2xx response other than 404.
    /// - [`AutocabError::Deserialize`] if the response shape is unexpected.
    pub async fn zone_for_address(&self, address: &str) -> Result<Option<Zone>, AutocabError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.zone_for_address_once(address)
        })
        .await
    }

    async fn zone_for_address_once(&self, address: &str) -> Result<Option<Zone>, AutocabError> {
        let url = self.url("address/v1/zone")?;
        let response = self
            .client
            .post(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .json(&ZoneRequest { text: address })
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(unexpected(status, body));
        }
        let zone: Zone = serde_json::from_str(&body).map_err(|e| AutocabError::Deserialize {
            context: format!("zoneForAddress({address})"),
            source: e,
        })?;
        Ok(Some(zone))
    }

    fn url(&self, path: &str) -> Result<Url, AutocabError> {
        self.base_url
            .join(path)
            .map_err(|e| AutocabError::UnexpectedStatus {
                status: 0,
                body: format!("invalid request path '{path}': {e}"),
            })
    }
}

#[async_trait]
impl ZoneLookup for AutocabClient {
    async fn lookup_zone(&self, address: &str) -> Result<Option<Zone>, GeoError> {
        self.zone_for_address(address)
            .await
            .map_err(|e| GeoError::ZoneLookup(e.to_string()))
    }
}

fn unexpected(status: StatusCode, mut body: String) -> AutocabError {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    AutocabError::UnexpectedStatus {
        status: status.as_u16(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_exactly_one_trailing_slash() {
        let client = AutocabClient::with_base_url("k", 8, "https://api.example.com").expect("ok");
        assert_eq!(
            client.url("booking/v1/search").expect("url").as_str(),
            "https://api.example.com/booking/v1/search"
        );
        let client = AutocabClient::with_base_url("k", 8, "https://api.example.com///").expect("ok");
        assert_eq!(
            client.url("booking/v1/booking/7").expect("url").as_str(),
            "https://api.example.com/booking/v1/booking/7"
        );
    }

    #[test]
    fn error_bodies_are_truncated() {
        let err = unexpected(StatusCode::BAD_GATEWAY, "x".repeat(2000));
        if let AutocabError::UnexpectedStatus { status, body } = err {
            assert_eq!(status, 502);
            assert_eq!(body.len(), MAX_ERROR_BODY);
        } else {
            panic!("expected UnexpectedStatus");
        }
    }
}
