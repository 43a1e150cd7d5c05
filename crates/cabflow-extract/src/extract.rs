//! Top-level email extraction.
//!
//! Orchestrates the field rules and the stop scanner into one canonical
//! [`ExtractedJob`]. Pure function of the input text, so running it twice
//! yields identical records.

use cabflow_core::{phone, ExtractedJob};

use crate::fields;
use crate::stops::{self, StopSection};

/// Maximum number of via points the record can carry.
const MAX_VIAS: usize = 5;

/// How many customer phone numbers are kept at the top level.
const MAX_CUSTOMER_PHONES: usize = 3;

/// Extracts a canonical booking record from raw email text.
///
/// Never fails: fields that cannot be read are left absent. Missing
/// passenger, luggage, and vehicle values take the booking defaults
/// (1 passenger, 0 luggage, `"Saloon"`).
#[must_use]
pub fn extract(email: &str) -> ExtractedJob {
    let mut job = ExtractedJob {
        date: fields::date(email),
        time: fields::time(email),
        luggage: fields::luggage(email),
        vehicle_type: fields::vehicle(email),
        price: fields::price(email),
        job_number: fields::job_number(email),
        customer_reference: fields::customer_reference(email),
        customer_account: fields::customer_account(email),
        flight_ref: fields::flight_ref(email),
        ..ExtractedJob::default()
    };

    let sections = stops::scan(email);
    let route = stops::route_sections(&sections);
    apply_route(&mut job, &route, email);

    job.passengers = section_passenger_total(&route)
        .or_else(|| fields::passengers(email))
        .or(Some(1));
    job.luggage = job.luggage.or(Some(0));
    job.vehicle_type = job.vehicle_type.or_else(|| Some("Saloon".to_owned()));

    job.customer_name = customer_from_sections(&route).or_else(|| fields::customer_name(email));

    let candidates = fields::phone_candidates(email);
    let picked = phone::prioritize(&candidates, MAX_CUSTOMER_PHONES);
    if !picked.is_empty() {
        job.customer_phone = Some(picked.join(", "));
    }

    job.mobility_aids = fields::mobility_aids(email).and_then(|raw| {
        fields::filter_mobility(
            &raw,
            job.customer_name.as_deref(),
            job.flight_ref.as_deref(),
        )
    });

    job.driver_notes = Some(driver_notes(&job));
    job.compact_vias();
    job
}

/// Lays the time-sorted route onto the record: first section is the pickup,
/// last is the destination, the rest become via points in order.
fn apply_route(job: &mut ExtractedJob, route: &[StopSection], email: &str) {
    match route {
        [] => {
            job.pickup = fields::pickup(email);
            job.destination = fields::destination(email);
        }
        [only] => {
            job.pickup = only.address.clone();
            job.pickup_note = only.note();
            job.destination = fields::destination(email);
        }
        [first, middle @ .., last] => {
            job.pickup = first.address.clone();
            job.pickup_note = first.note();
            job.destination = last.address.clone();
            job.destination_note = last.note();
            if let Some(time) = first.time {
                job.time = Some(time.format("%H:%M").to_string());
            }

            if middle.len() > MAX_VIAS {
                tracing::warn!(
                    stops = route.len(),
                    kept = MAX_VIAS + 2,
                    "booking has more stops than the record can carry, dropping excess via points"
                );
            }
            for (i, section) in middle.iter().take(MAX_VIAS).enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let slot = (i + 1) as u8;
                job.set_via(slot, section.address.clone());
                job.set_via_note(slot, section.note());
            }
        }
    }
}

/// Total passengers across the route's sections, when any section counts them.
fn section_passenger_total(route: &[StopSection]) -> Option<u32> {
    let counts: Vec<u32> = route.iter().filter_map(|s| s.passengers).collect();
    if counts.is_empty() {
        None
    } else {
        Some(counts.iter().sum())
    }
}

/// The "most populated section" rule: the customer is the named contact of
/// the section serving the most passengers. Ties go to the earliest section
/// in time order.
fn customer_from_sections(route: &[StopSection]) -> Option<String> {
    let mut best: Option<&StopSection> = None;
    for section in route {
        let (Some(_), Some(count)) = (&section.name, section.passengers) else {
            continue;
        };
        if best.is_none_or(|b| count > b.passengers.unwrap_or(0)) {
            best = Some(section);
        }
    }
    best.and_then(|s| s.name.clone())
}

/// Synthesizes the driver-facing summary line.
fn driver_notes(job: &ExtractedJob) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(vehicle) = &job.vehicle_type {
        parts.push(vehicle.clone());
    }
    if let Some(passengers) = job.passengers {
        parts.push(format!("{passengers} passengers"));
    }
    if let Some(luggage) = job.luggage {
        parts.push(format!("{luggage} luggage"));
    }
    if let Some(aids) = &job.mobility_aids {
        parts.push(aids.clone());
    }
    if let Some(flight) = &job.flight_ref {
        parts.push(flight.clone());
    }
    parts.join(", ")
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod extract_test;
