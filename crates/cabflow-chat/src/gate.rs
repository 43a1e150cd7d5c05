//! Field-completeness gates and deterministic inference.
//!
//! Conversational input is assumed lower-quality than email, so the address
//! gate here is stricter than the email extractor's: an address only counts
//! once it carries both a comma and a UK postcode.

use regex::Regex;

/// The seven required fields, in fixed question-priority order.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "date",
    "time",
    "pickup",
    "destination",
    "customerName",
    "phone",
    "vehicle",
];

/// A pickup/destination counts as present only with a comma AND a UK
/// postcode; anything less forces a follow-up question.
#[must_use]
pub fn address_is_complete(text: &str) -> bool {
    let postcode =
        Regex::new(r"(?i)[A-Z]{1,2}\d{1,2}[A-Z]?\s*\d[A-Z]{2}").expect("valid postcode regex");
    text.contains(',') && postcode.is_match(text)
}

/// Deterministic passenger-count → vehicle mapping. Only fires once the
/// passenger count is known.
#[must_use]
pub fn infer_vehicle(passengers: u32) -> &'static str {
    match passengers {
        0..=3 => "Saloon",
        4..=5 => "Estate",
        6..=7 => "MPV",
        _ => "Large MPV",
    }
}

/// The single clarifying question asked for a missing field.
#[must_use]
pub fn question_for(field: &str) -> String {
    match field {
        "date" => "What date is the journey?".to_owned(),
        "time" => "What time would you like to be picked up?".to_owned(),
        "pickup" => {
            "What is the full pickup address, including the postcode?".to_owned()
        }
        "destination" => {
            "What is the full destination address, including the postcode?".to_owned()
        }
        "customerName" => "What name is the booking under?".to_owned(),
        "phone" => "What is the best contact number for the passenger?".to_owned(),
        "vehicle" => "How many passengers will be travelling?".to_owned(),
        other => format!("Could you tell me the {other} for the booking?"),
    }
}
