//! Per-field rule tables and field-level post-filters.
//!
//! Each function owns the ordered pattern list for one booking field. The
//! ordering inside each list is deliberate — notably the price list, which
//! prefers the ex-VAT "Job Price" over the inc-VAT "Total Price".

use cabflow_core::{dates, phone};
use regex::Regex;
use rust_decimal::Decimal;

use crate::rules::{first_match, first_match_where, rules};

/// Extracts and normalizes the booking date (`DD/MM/YYYY`).
#[must_use]
pub fn date(text: &str) -> Option<String> {
    let rule_list = rules(&[
        r"(?im)^[^\S\n]*date[^\S\n]*:[^\S\n]*(.+)$",
        r"(?i)\b(\d{1,2}(?:st|nd|rd|th)?\s+(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{4})\b",
        r"\b(\d{1,2}[/.-]\d{1,2}[/.-]\d{2,4})\b",
    ]);
    first_match_where(&rule_list, text, |v| dates::parse_booking_date(v).is_some())
        .and_then(|v| dates::parse_booking_date(&v))
}

/// Extracts and normalizes the pickup time (`HH:MM`).
#[must_use]
pub fn time(text: &str) -> Option<String> {
    let rule_list = rules(&[
        r"(?i)pick\s*up(?:\s+time)?\s*:?\s*(\d{1,2}[:.]\d{2})",
        r"(?im)^[^\S\n]*time[^\S\n]*:[^\S\n]*(.+)$",
        r"\b(\d{1,2}:\d{2})\b",
    ]);
    first_match_where(&rule_list, text, |v| dates::parse_booking_time(v).is_some())
        .and_then(|v| dates::parse_booking_time(&v))
}

/// Extracts the pickup address from single-stop booking emails.
#[must_use]
pub fn pickup(text: &str) -> Option<String> {
    let rule_list = rules(&[
        r"(?im)^[^\S\n]*(?:pick\s*up|collection)(?:\s+address)?\s*:\s*(.+)$",
        r"(?im)^[^\S\n]*from\s*:\s*(.+)$",
    ]);
    first_match_where(&rule_list, text, looks_like_address)
}

/// Extracts the destination address from single-stop booking emails.
#[must_use]
pub fn destination(text: &str) -> Option<String> {
    let rule_list = rules(&[
        r"(?im)^[^\S\n]*(?:drop\s*off|destination)(?:\s+address)?\s*:\s*(.+)$",
        r"(?im)^[^\S\n]*to\s*:\s*(.+)$",
    ]);
    first_match_where(&rule_list, text, looks_like_address)
}

/// Accepts address-shaped captures only: must contain a letter and must not
/// be an email header value or a bare clock time.
fn looks_like_address(value: &str) -> bool {
    value.contains(char::is_alphabetic)
        && !value.contains('@')
        && dates::parse_booking_time(value).is_none()
}

#[must_use]
pub fn passengers(text: &str) -> Option<u32> {
    let rule_list = rules(&[
        r"(?i)passengers?\s*:?\s*(\d{1,2})",
        r"(?i)\bpax\s*:?\s*(\d{1,2})",
    ]);
    first_match(&rule_list, text)
        .and_then(|v| v.parse().ok())
        .filter(|&n| n >= 1)
}

#[must_use]
pub fn luggage(text: &str) -> Option<u32> {
    let rule_list = rules(&[
        r"(?i)luggage\s*:?\s*(\d{1,2})",
        r"(?i)\b(?:bags|cases|suitcases)\s*:?\s*(\d{1,2})",
    ]);
    first_match(&rule_list, text).and_then(|v| v.parse().ok())
}

#[must_use]
pub fn vehicle(text: &str) -> Option<String> {
    let rule_list = rules(&[
        r"(?im)^[^\S\n]*vehicle(?:\s+type)?\s*:\s*(.+)$",
        r"(?i)\b(large\s+mpv|mpv|saloon|estate|minibus|executive)\b",
    ]);
    first_match(&rule_list, text)
}

/// Extracts the price, preferring the ex-VAT "Job Price" over the inc-VAT
/// "Total Price". The ordering is a business rule, not an accident.
#[must_use]
pub fn price(text: &str) -> Option<Decimal> {
    let rule_list = rules(&[
        r"(?i)job\s+price[^0-9£\n]*£?\s*(\d+(?:\.\d{1,2})?)",
        r"(?i)price\s*\(?ex\.?\s*vat\)?[^0-9£\n]*£?\s*(\d+(?:\.\d{1,2})?)",
        r"(?i)total\s+price[^0-9£\n]*£?\s*(\d+(?:\.\d{1,2})?)",
        r"£\s*(\d+(?:\.\d{1,2})?)",
    ]);
    first_match(&rule_list, text).and_then(|v| v.parse().ok())
}

#[must_use]
pub fn job_number(text: &str) -> Option<String> {
    let rule_list = rules(&[
        r"(?i)job\s*(?:no|number|ref)\.?\s*:?\s*([A-Za-z0-9/-]+)",
        r"(?i)booking\s+ref(?:erence)?\s*:?\s*([A-Za-z0-9/-]+)",
    ]);
    first_match(&rule_list, text)
}

#[must_use]
pub fn customer_reference(text: &str) -> Option<String> {
    let rule_list = rules(&[
        r"(?i)(?:your|customer)\s+ref(?:erence)?\s*:?\s*([A-Za-z0-9/-]+)",
        r"(?i)\bpo\s*(?:no|number)?\s*:?\s*([A-Za-z0-9/-]+)",
    ]);
    first_match(&rule_list, text)
}

#[must_use]
pub fn customer_account(text: &str) -> Option<String> {
    let rule_list = rules(&[r"(?i)account(?:\s+(?:no|number|code))?\s*:?\s*([A-Za-z0-9-]+)"]);
    first_match(&rule_list, text)
}

/// Simple first-match customer name; the multi-stop heuristic in
/// [`crate::extract`] takes precedence when stop sections carry names.
#[must_use]
pub fn customer_name(text: &str) -> Option<String> {
    let rule_list = rules(&[
        r"(?im)^[^\S\n]*(?:passenger|customer|lead)\s+name\s*:\s*(.+)$",
        r"(?im)^[^\S\n]*name\s*:\s*(.+)$",
    ]);
    first_match(&rule_list, text)
}

#[must_use]
pub fn flight_ref(text: &str) -> Option<String> {
    let rule_list = rules(&[
        r"(?i)flight\s*(?:no|number|ref)?\.?\s*:?\s*([A-Za-z]{1,3}\s?\d{1,4}[A-Za-z]?)",
        r"(?im)^[^\S\n]*(?:ship|cruise|vessel)\s*:\s*(.+)$",
    ]);
    first_match(&rule_list, text).map(|v| v.to_uppercase())
}

/// Raw mobility-aids capture; run through [`filter_mobility`] before use.
#[must_use]
pub fn mobility_aids(text: &str) -> Option<String> {
    let rule_list = rules(&[
        r"(?im)^[^\S\n]*mobility(?:\s+aids?)?\s*:\s*(.+)$",
        r"(?i)\b(wheelchair|walking\s+frame|walking\s+stick|mobility\s+scooter|zimmer\s+frame)\b",
    ]);
    first_match(&rule_list, text)
}

/// Rejects mobility captures that are really customer-name fragments or
/// flight/ship references leaked from the same line of the source email.
#[must_use]
pub fn filter_mobility(
    raw: &str,
    customer_name: Option<&str>,
    flight_ref: Option<&str>,
) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let lower = value.to_lowercase();
    if matches!(lower.as_str(), "none" | "n/a" | "no" | "-") {
        return None;
    }
    let flight_like = Regex::new(r"(?i)\b[A-Z]{2,3}\s?\d{2,4}\b").expect("valid flight regex");
    if flight_like.is_match(value) {
        return None;
    }
    if let Some(flight) = flight_ref {
        if lower.contains(&flight.to_lowercase()) {
            return None;
        }
    }
    if let Some(name) = customer_name {
        if name
            .to_lowercase()
            .split_whitespace()
            .any(|token| token.len() > 2 && lower.contains(token))
        {
            return None;
        }
    }
    Some(value.to_owned())
}

/// All normalized phone numbers found anywhere in the document, in order of
/// first appearance, deduplicated.
#[must_use]
pub fn phone_candidates(text: &str) -> Vec<String> {
    let re = Regex::new(r"(?:\+?44|0)[\s\-()]*\d(?:[\s\-()]*\d){8,12}").expect("valid phone regex");
    let mut out: Vec<String> = Vec::new();
    for found in re.find_iter(text) {
        if let Some(normalized) = phone::normalize_uk_phone(found.as_str()) {
            if !out.contains(&normalized) {
                out.push(normalized);
            }
        }
    }
    out
}
