//! Booking date and time parsing.
//!
//! The canonical forms carried on [`crate::ExtractedJob`] are `DD/MM/YYYY`
//! and `HH:MM`. Email sources prefer the word form (`"15 July 2025"`);
//! numeric slash/dash forms are accepted as fallbacks.

use chrono::{Local, NaiveDate, NaiveTime};

/// Month-name lookup, full names and common three-letter abbreviations.
const MONTHS: [(&str, u32); 12] = [
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

/// Resolves a month name (full or 3-letter prefix) to its number.
#[must_use]
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .find(|(month, _)| *month == lower || (lower.len() >= 3 && month.starts_with(&lower)))
        .map(|&(_, n)| n)
}

/// Parses a free-form booking date into canonical `DD/MM/YYYY`.
///
/// Word form (`"15 July 2025"`, `"3rd Mar 2026"`) is tried first, then
/// numeric slash/dash/dot forms (`"15/07/2025"`, `"15-7-25"`). Returns
/// `None` when no calendar-valid date can be read.
#[must_use]
pub fn parse_booking_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    word_form_date(trimmed).or_else(|| numeric_date(trimmed))
}

fn word_form_date(text: &str) -> Option<String> {
    let mut day: Option<u32> = None;
    let mut month: Option<u32> = None;
    let mut year: Option<i32> = None;

    for token in text.split_whitespace() {
        let clean: String = token
            .trim_matches(|c: char| !c.is_ascii_alphanumeric())
            .to_owned();
        if clean.is_empty() {
            continue;
        }
        if clean.chars().all(|c| c.is_ascii_digit()) {
            if clean.len() == 4 && year.is_none() {
                year = clean.parse().ok();
            } else if clean.len() <= 2 && day.is_none() {
                day = clean.parse().ok();
            }
        } else {
            // Ordinal days carry a suffix: "15th", "3rd".
            let digits: String = clean.chars().take_while(char::is_ascii_digit).collect();
            if !digits.is_empty() && digits.len() <= 2 && day.is_none() {
                day = digits.parse().ok();
            } else if digits.is_empty() && month.is_none() {
                month = month_number(&clean);
            }
        }
    }

    format_date(day?, month?, year?)
}

fn numeric_date(text: &str) -> Option<String> {
    let parts: Vec<&str> = text
        .split(['/', '-', '.'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let mut year: i32 = parts[2].parse().ok()?;
    if parts[2].len() == 2 {
        year += 2000;
    }
    format_date(day, month, year)
}

fn format_date(day: u32, month: u32, year: i32) -> Option<String> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.format("%d/%m/%Y").to_string())
}

/// Parses a clock time (`"09:30"`, `"9.30"`) into canonical `HH:MM`.
#[must_use]
pub fn parse_booking_time(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let (hours_part, minutes_part) = trimmed.split_once([':', '.'])?;
    let hours: u32 = hours_part.trim().parse().ok()?;
    let minute_digits: String = minutes_part
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .take(2)
        .collect();
    let minutes: u32 = minute_digits.parse().ok()?;
    let time = NaiveTime::from_hms_opt(hours, minutes, 0)?;
    Some(time.format("%H:%M").to_string())
}

/// Parses a canonical `DD/MM/YYYY` string back into a [`NaiveDate`].
#[must_use]
pub fn parse_canonical_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%d/%m/%Y").ok()
}

/// Parses a canonical `HH:MM` string back into a [`NaiveTime`].
#[must_use]
pub fn parse_canonical_time(time: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M").ok()
}

/// Today's date in canonical `DD/MM/YYYY` form, local wall-clock.
#[must_use]
pub fn today_canonical() -> String {
    Local::now().date_naive().format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_form_is_normalized() {
        assert_eq!(
            parse_booking_date("15 July 2025").as_deref(),
            Some("15/07/2025")
        );
    }

    #[test]
    fn word_form_accepts_ordinals_and_abbreviations() {
        assert_eq!(
            parse_booking_date("3rd Mar 2026").as_deref(),
            Some("03/03/2026")
        );
        assert_eq!(
            parse_booking_date("1st September 2025").as_deref(),
            Some("01/09/2025")
        );
    }

    #[test]
    fn numeric_forms_are_normalized() {
        assert_eq!(
            parse_booking_date("15/7/2025").as_deref(),
            Some("15/07/2025")
        );
        assert_eq!(
            parse_booking_date("15-07-25").as_deref(),
            Some("15/07/2025")
        );
    }

    #[test]
    fn invalid_dates_are_rejected() {
        assert_eq!(parse_booking_date("32 July 2025"), None);
        assert_eq!(parse_booking_date("soonish"), None);
        assert_eq!(parse_booking_date(""), None);
    }

    #[test]
    fn times_are_normalized() {
        assert_eq!(parse_booking_time("09:30").as_deref(), Some("09:30"));
        assert_eq!(parse_booking_time("9.5").as_deref(), Some("09:05"));
        assert_eq!(parse_booking_time("23:59").as_deref(), Some("23:59"));
    }

    #[test]
    fn invalid_times_are_rejected() {
        assert_eq!(parse_booking_time("25:00"), None);
        assert_eq!(parse_booking_time("morning"), None);
    }

    #[test]
    fn canonical_round_trip() {
        let date = parse_canonical_date("15/07/2025").expect("parses");
        assert_eq!(date.format("%d/%m/%Y").to_string(), "15/07/2025");
        let time = parse_canonical_time("09:30").expect("parses");
        assert_eq!(time.format("%H:%M").to_string(), "09:30");
    }

    #[test]
    fn month_number_resolves_names() {
        assert_eq!(month_number("July"), Some(7));
        assert_eq!(month_number("dec"), Some(12));
        assert_eq!(month_number("smarch"), None);
    }
}
