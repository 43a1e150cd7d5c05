//! Mapping from the canonical record to the AUTOCAB submission schema.
//!
//! Covers the three fiddly parts of the mapping: the passenger-attribution
//! index built from per-stop notes, splitting bookings of more than eight
//! passengers into sequential groups, and the admin-only manual price
//! override.

use std::collections::HashMap;

use cabflow_core::{dates, ExtractedJob, StopKey};
use cabflow_geo::ResolvedAddress;
use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;

use crate::error::AutocabError;
use crate::types::{
    BookingStop, BookingSubmission, PassengerDetail, PricingBlock, StopType, YourReferences,
};

/// Largest passenger count a single booking may carry.
pub const MAX_GROUP_SIZE: u32 = 8;

/// Caller-supplied submission flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionOptions {
    /// Enables the manual price override block when a positive price is set.
    pub admin_mode: bool,
}

/// Splits a passenger total into sequential group sizes of at most
/// [`MAX_GROUP_SIZE`], e.g. `17 → [8, 8, 1]`.
#[must_use]
pub fn split_passenger_groups(total: u32) -> Vec<u32> {
    let mut remaining = total;
    let mut groups = Vec::new();
    while remaining > 0 {
        let size = remaining.min(MAX_GROUP_SIZE);
        groups.push(size);
        remaining -= size;
    }
    groups
}

/// The passenger table built from per-stop notes, plus the name → index map.
#[derive(Debug, Default)]
pub struct PassengerIndex {
    pub details: Vec<PassengerDetail>,
    by_name: HashMap<String, usize>,
}

impl PassengerIndex {
    /// The index assigned to a passenger name, if the name was seen.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(&name.trim().to_lowercase()).copied()
    }
}

/// Builds the passenger table by scanning all seven note slots in visit
/// order. Each distinct name gets the next sequential index from 0; a name
/// seen again at a later stop reuses its existing index.
#[must_use]
pub fn passenger_mapping(job: &ExtractedJob) -> PassengerIndex {
    let mut index = PassengerIndex::default();
    for key in StopKey::VISIT_ORDER {
        let Some((name, phones)) = job.note(key).and_then(parse_note) else {
            continue;
        };
        let lookup = name.to_lowercase();
        if !index.by_name.contains_key(&lookup) {
            index.by_name.insert(lookup, index.details.len());
            index.details.push(PassengerDetail { name, phones });
        }
    }
    index
}

/// Parses a `"Name - phone1, phone2"` note into its parts.
fn parse_note(note: &str) -> Option<(String, Vec<String>)> {
    let (name, phones) = note.split_once(" - ")?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let phones: Vec<String> = phones
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect();
    Some((name.to_owned(), phones))
}

/// Maps the canonical record and its resolved addresses to one submission.
///
/// Passenger-group splitting happens in the workflow, not here: the
/// submission carries the full passenger count and
/// [`split_passenger_groups`] divides it at send time.
///
/// # Errors
///
/// Returns [`AutocabError::InvalidSubmission`] when the record lacks a
/// pickup address, a resolved pickup, or a usable date/time.
pub fn build_submission(
    job: &ExtractedJob,
    resolved: &HashMap<StopKey, ResolvedAddress>,
    options: SubmissionOptions,
) -> Result<BookingSubmission, AutocabError> {
    let pickup_address = resolved
        .get(&StopKey::Pickup)
        .ok_or_else(|| AutocabError::InvalidSubmission("pickup address is required".to_owned()))?;

    let date = job
        .date
        .as_deref()
        .ok_or_else(|| AutocabError::InvalidSubmission("booking date is required".to_owned()))?;
    let time = job
        .time
        .as_deref()
        .ok_or_else(|| AutocabError::InvalidSubmission("pickup time is required".to_owned()))?;
    let pickup_due_time = wall_clock_due_time(date, time).ok_or_else(|| {
        AutocabError::InvalidSubmission(format!("unusable pickup date/time '{date} {time}'"))
    })?;

    if let Some(day) = dates::parse_canonical_date(date) {
        // Diagnostics only: the API expects UK wall-clock time either way.
        tracing::debug!(
            date,
            daylight_saving = uk_daylight_saving(day),
            "encoding pickup due time as local wall clock"
        );
    }

    let passengers_index = passenger_mapping(job);
    let stop = |key: StopKey, stop_type: StopType, address: &ResolvedAddress| -> BookingStop {
        let note = job.note(key).map(str::to_owned);
        let passenger_details_index = note
            .as_deref()
            .and_then(parse_note)
            .and_then(|(name, _)| passengers_index.index_of(&name));
        BookingStop {
            address: address.clone(),
            note,
            passenger_details_index,
            stop_type,
        }
    };

    let pickup = stop(StopKey::Pickup, StopType::Pickup, pickup_address);
    let vias: Vec<BookingStop> = (1..=5)
        .filter_map(|n| {
            resolved
                .get(&StopKey::Via(n))
                .map(|address| stop(StopKey::Via(n), StopType::Via, address))
        })
        .collect();
    let destination = resolved
        .get(&StopKey::Destination)
        .map(|address| stop(StopKey::Destination, StopType::Destination, address));

    let pricing = if options.admin_mode {
        job.price.filter(|p| *p > Decimal::ZERO).map(PricingBlock::manual)
    } else {
        None
    };

    Ok(BookingSubmission {
        pickup_due_time,
        name: job.customer_name.clone(),
        telephone_number: job.customer_phone.clone(),
        passengers: job.passengers.unwrap_or(1),
        luggage: job.luggage.unwrap_or(0),
        vehicle_type: job.vehicle_type.clone(),
        driver_note: job.driver_notes.clone(),
        pickup,
        vias,
        destination,
        extra_passenger_details: passengers_index.details,
        pricing,
        your_references: YourReferences {
            your_reference1: job.job_number.clone(),
            your_reference2: job.customer_account.clone(),
        },
        row_version: None,
    })
}

/// Encodes canonical date/time as the local wall-clock string the API
/// expects: `YYYY-MM-DDTHH:MM:00.000`, never converted to UTC.
#[must_use]
pub fn wall_clock_due_time(date: &str, time: &str) -> Option<String> {
    let day = dates::parse_canonical_date(date)?;
    let clock = dates::parse_canonical_time(time)?;
    Some(format!(
        "{}T{}:00.000",
        day.format("%Y-%m-%d"),
        clock.format("%H:%M")
    ))
}

/// Whether UK daylight saving is in effect on `date` (last Sunday of March
/// up to, not including, the last Sunday of October). Diagnostics only.
#[must_use]
pub fn uk_daylight_saving(date: NaiveDate) -> bool {
    let bounds = (
        last_sunday(date.year(), 3),
        last_sunday(date.year(), 10),
    );
    match bounds {
        (Some(start), Some(end)) => date >= start && date < end,
        _ => false,
    }
}

fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = NaiveDate::from_ymd_opt(year, month + 1, 1)?;
    let last = first_of_next.pred_opt()?;
    let back = u64::from(last.weekday().num_days_from_sunday());
    last.checked_sub_days(Days::new(back))
}
