//! AUTOCAB API wire types.
//!
//! Only the subset of the booking schema the pipeline produces and the
//! duplicate/edit workflow reacts to is modelled here; everything else the
//! API returns is ignored on deserialization.

use cabflow_geo::ResolvedAddress;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A booking as returned by the API (fetch and search).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub booking_id: i64,
    /// Concurrency token; must be echoed unchanged on update.
    #[serde(default)]
    pub row_version: Option<i64>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub your_references: Option<YourReferences>,
    #[serde(default)]
    pub pickup_due_time: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub telephone_number: Option<String>,
}

/// Caller-owned reference fields: 1 carries the job number, 2 the account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YourReferences {
    #[serde(default)]
    pub your_reference1: Option<String>,
    #[serde(default)]
    pub your_reference2: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedBooking {
    pub booking_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchRequest {
    pub from: String,
    pub to: String,
    pub your_reference: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ZoneRequest<'a> {
    pub text: &'a str,
}

/// The role of a stop within a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopType {
    Pickup,
    Via,
    Destination,
}

/// One stop of a submission: resolved address plus passenger attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStop {
    pub address: ResolvedAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Index into [`BookingSubmission::extra_passenger_details`], when the
    /// stop's note names a passenger.
    pub passenger_details_index: Option<usize>,
    #[serde(rename = "type")]
    pub stop_type: StopType,
}

/// A named passenger with contact numbers, referenced by stops via index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerDetail {
    pub name: String,
    pub phones: Vec<String>,
}

/// Manual price override block. Only attached in admin mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBlock {
    pub is_manual: bool,
    pub is_locked: bool,
    pub price: Decimal,
    pub cost: Decimal,
    pub fare: Decimal,
    pub cash_amount: Decimal,
    pub fee: Decimal,
    pub commission: Decimal,
    pub extras: Decimal,
    pub waiting: Decimal,
}

impl PricingBlock {
    /// A locked manual price: fee/commission fields zeroed, the price
    /// carried into price, cost, fare, and cash amount.
    #[must_use]
    pub fn manual(price: Decimal) -> Self {
        Self {
            is_manual: true,
            is_locked: true,
            price,
            cost: price,
            fare: price,
            cash_amount: price,
            fee: Decimal::ZERO,
            commission: Decimal::ZERO,
            extras: Decimal::ZERO,
            waiting: Decimal::ZERO,
        }
    }
}

/// The payload sent to create or update a booking.
///
/// Constructed fresh per submission attempt. `row_version` is populated from
/// a prior fetch on the edit path and echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSubmission {
    /// Local UK wall-clock time, `YYYY-MM-DDTHH:MM:00.000` — never UTC.
    pub pickup_due_time: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub telephone_number: Option<String>,
    pub passengers: u32,
    pub luggage: u32,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub driver_note: Option<String>,
    pub pickup: BookingStop,
    pub vias: Vec<BookingStop>,
    #[serde(default)]
    pub destination: Option<BookingStop>,
    pub extra_passenger_details: Vec<PassengerDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingBlock>,
    pub your_references: YourReferences,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_version: Option<i64>,
}
