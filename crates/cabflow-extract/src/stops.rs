//! Multi-stop section scanning.
//!
//! Group-booking emails repeat `PICK UP`/`DROP OFF` sections, each with its
//! own time, `ADDRESS:`, `NAME:`, `PHONE:`, and `PASSENGERS:` lines. The
//! source document does not guarantee chronological order, so sections are
//! sorted by time-of-day before the route is assembled.

use cabflow_core::phone;
use chrono::NaiveTime;
use regex::Regex;

/// One scanned `PICK UP`/`DROP OFF` section, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopSection {
    pub is_drop_off: bool,
    /// Time from the section header line, when present.
    pub time: Option<NaiveTime>,
    pub address: Option<String>,
    pub name: Option<String>,
    /// Normalized `+44…` numbers from the section's phone line.
    pub phones: Vec<String>,
    pub passengers: Option<u32>,
}

impl StopSection {
    /// The `"Name - phone1, phone2"` note for this stop.
    ///
    /// Absent (not empty) when the section has no name or no phone.
    #[must_use]
    pub fn note(&self) -> Option<String> {
        let name = self.name.as_deref()?.trim();
        if name.is_empty() || self.phones.is_empty() {
            return None;
        }
        Some(format!("{name} - {}", self.phones.join(", ")))
    }
}

/// Scans the document for stop sections, in document order.
#[must_use]
pub fn scan(text: &str) -> Vec<StopSection> {
    let header =
        Regex::new(r"(?im)^[^\S\n]*(?:\d+(?:st|nd|rd|th)\s+)?(pick\s*up|drop\s*off)\b[^\n]*")
            .expect("valid section header regex");

    let headers: Vec<(usize, usize, bool)> = header
        .captures_iter(text)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let kind = captures.get(1)?.as_str().to_lowercase();
            Some((whole.start(), whole.end(), kind.starts_with("drop")))
        })
        .collect();

    headers
        .iter()
        .enumerate()
        .map(|(i, &(start, header_end, is_drop_off))| {
            let section_end = headers.get(i + 1).map_or(text.len(), |&(next, _, _)| next);
            let header_line = &text[start..header_end];
            let body = &text[header_end..section_end];
            parse_section(header_line, body, is_drop_off)
        })
        .collect()
}

fn parse_section(header_line: &str, body: &str, is_drop_off: bool) -> StopSection {
    let time_re = Regex::new(r"\b(\d{1,2})[:.](\d{2})\b").expect("valid time regex");
    let time = time_re.captures(header_line).and_then(|c| {
        let hours: u32 = c[1].parse().ok()?;
        let minutes: u32 = c[2].parse().ok()?;
        NaiveTime::from_hms_opt(hours, minutes, 0)
    });

    let line_value = |label: &str| -> Option<String> {
        let re = Regex::new(&format!(r"(?im)^[^\S\n]*{label}\s*:\s*(.+)$"))
            .expect("valid section line regex");
        re.captures(body)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_owned())
            .filter(|v| !v.is_empty())
    };

    let address = line_value("address");
    let name = line_value("name");
    let phones = line_value(r"(?:phone|tel|mobile|contact)(?:\s+(?:no|number))?")
        .map(|raw| phone::split_phones(&raw))
        .unwrap_or_default();

    let passengers_re =
        Regex::new(r"(?i)passengers?\s*:?\s*(\d{1,2})").expect("valid passengers regex");
    let passengers = passengers_re
        .captures(body)
        .and_then(|c| c[1].parse().ok())
        .filter(|&n: &u32| n >= 1);

    StopSection {
        is_drop_off,
        time,
        address,
        name,
        phones,
        passengers,
    }
}

/// Sorts sections by time ascending; sections without a time keep their
/// document order after all timed sections.
#[must_use]
pub fn sort_by_time(mut sections: Vec<StopSection>) -> Vec<StopSection> {
    sections.sort_by_key(|s| (s.time.is_none(), s.time));
    sections
}

/// Time-sorted sections that carry an address, with duplicate addresses
/// removed (first occurrence wins).
#[must_use]
pub fn route_sections(sections: &[StopSection]) -> Vec<StopSection> {
    let sorted = sort_by_time(sections.to_vec());
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for section in sorted {
        let Some(address) = section.address.as_deref() else {
            continue;
        };
        let key = address.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(section);
    }
    out
}
