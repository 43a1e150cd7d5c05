//! UK phone number normalization.
//!
//! Booking sources write phone numbers every way imaginable: `07700 900123`,
//! `+44 7700 900123`, `447700900123`, `7700900123`, or several numbers
//! separated by `/`. Everything here normalizes to canonical `+44…` form.

/// Normalizes a raw UK phone number to `+44…` form.
///
/// Handles `+44`/`0044`/`44` international prefixes and the common case of a
/// 10-digit number missing its trunk zero (mobile `7…` or geographic
/// `1…`/`2…` numbers). Returns `None` when the input cannot be read as a
/// plausible 11-digit UK number.
#[must_use]
pub fn normalize_uk_phone(raw: &str) -> Option<String> {
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 10 {
        return None;
    }

    // Reduce international forms to the national 0-prefixed form.
    if let Some(rest) = digits.strip_prefix("0044") {
        digits = format!("0{rest}");
    } else if digits.len() >= 12 {
        if let Some(rest) = digits.strip_prefix("44") {
            digits = format!("0{rest}");
        }
    }

    // 10-digit numbers with the trunk zero dropped.
    if digits.len() == 10 && matches!(digits.as_bytes()[0], b'7' | b'1' | b'2') {
        digits.insert(0, '0');
    }

    if digits.len() == 11 && digits.starts_with('0') {
        Some(format!("+44{}", &digits[1..]))
    } else {
        None
    }
}

/// Splits a free-text phone field on `/`, commas, and whitespace, normalizes
/// each piece, and deduplicates while preserving order.
///
/// Each `/`- or `,`-separated segment is first read as one number with
/// internal whitespace removed (`"07700 900123"`); if that fails the segment
/// is re-read as whitespace-separated numbers.
#[must_use]
pub fn split_phones(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |normalized: String, out: &mut Vec<String>| {
        if !out.contains(&normalized) {
            out.push(normalized);
        }
    };
    for segment in raw.split(['/', ',']) {
        let joined: String = segment.chars().filter(|c| !c.is_whitespace()).collect();
        if joined.is_empty() {
            continue;
        }
        if let Some(normalized) = normalize_uk_phone(&joined) {
            push(normalized, &mut out);
        } else {
            for piece in segment.split_whitespace() {
                if let Some(normalized) = normalize_uk_phone(piece) {
                    push(normalized, &mut out);
                }
            }
        }
    }
    out
}

/// Returns `true` for normalized UK mobile numbers (`+447…`).
#[must_use]
pub fn is_mobile(normalized: &str) -> bool {
    normalized.starts_with("+447")
}

/// Orders candidate numbers mobiles-first, deduplicates, and caps the result.
///
/// Landlines (`+441…`/`+442…`) follow mobiles in their original order.
#[must_use]
pub fn prioritize(candidates: &[String], cap: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for phone in candidates.iter().filter(|p| is_mobile(p)) {
        if !out.contains(phone) {
            out.push(phone.clone());
        }
    }
    for phone in candidates.iter().filter(|p| !is_mobile(p)) {
        if !out.contains(phone) {
            out.push(phone.clone());
        }
    }
    out.truncate(cap);
    out
}
