//! Free-text UK address parsing.
//!
//! Splits `"12 Ongar Road, Upminster, Essex RM14 2AB"` into house, street,
//! town, and postcode. The town keeps every trailing comma segment so
//! multi-part localities (`"Upminster, Essex"`) survive intact.

use regex::Regex;

/// The component parts of a parsed address, postcode stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub house: String,
    pub street: String,
    pub town: String,
    /// Uppercased, single-space form (`"RM14 2AB"`); empty when absent.
    pub postcode: String,
}

/// Parses a free-text address into its components.
///
/// The trailing UK postcode (if any) is stripped first. Of the remaining
/// comma segments: a leading numeric token in the first segment becomes
/// `house` with the rest of that segment as `street`; otherwise the whole
/// first segment is `street`. All later segments join with `", "` as `town`.
#[must_use]
pub fn parse_address(raw: &str) -> ParsedAddress {
    let (remainder, postcode) = split_postcode(raw);

    let mut segments = remainder
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (house, street) = match segments.next() {
        Some(first) => split_house(first),
        None => (String::new(), String::new()),
    };
    let town = segments.collect::<Vec<_>>().join(", ");

    ParsedAddress {
        house,
        street,
        town,
        postcode,
    }
}

/// Strips a trailing UK postcode, returning `(remainder, postcode)`.
///
/// The postcode is normalized to uppercase with a single space between the
/// outward and inward codes. When no postcode is present the remainder is
/// the trimmed input and the postcode is empty.
#[must_use]
pub fn split_postcode(raw: &str) -> (String, String) {
    let re = Regex::new(r"(?i)([A-Z]{1,2}\d{1,2}[A-Z]?)\s*(\d[A-Z]{2})\s*$")
        .expect("valid postcode regex");
    if let Some(captures) = re.captures(raw) {
        let outward = captures[1].to_uppercase();
        let inward = captures[2].to_uppercase();
        let match_start = captures.get(0).map_or(raw.len(), |m| m.start());
        let remainder = raw[..match_start]
            .trim()
            .trim_end_matches(',')
            .trim()
            .to_owned();
        (remainder, format!("{outward} {inward}"))
    } else {
        (raw.trim().to_owned(), String::new())
    }
}

/// Splits a leading numeric house token off a street segment.
fn split_house(segment: &str) -> (String, String) {
    let mut tokens = segment.split_whitespace();
    match tokens.next() {
        Some(first) if first.starts_with(|c: char| c.is_ascii_digit()) => {
            let street = tokens.collect::<Vec<_>>().join(" ");
            (first.to_owned(), street)
        }
        _ => (String::new(), segment.trim().to_owned()),
    }
}
