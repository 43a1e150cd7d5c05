//! The canonical intermediate booking record produced by extraction.
//!
//! Both the email extractor and the conversational extractor emit an
//! [`ExtractedJob`]; downstream address resolution and payload building
//! consume it. Every field is optional — a field that could not be extracted
//! is simply absent, and the caller decides what is required.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifies one of the seven possible stops of a booking, in visit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopKey {
    Pickup,
    /// Intermediate stop, numbered 1–5. Via 1 is visited before via 2.
    Via(u8),
    Destination,
}

impl StopKey {
    /// All seven stop slots in the order they are visited.
    pub const VISIT_ORDER: [StopKey; 7] = [
        StopKey::Pickup,
        StopKey::Via(1),
        StopKey::Via(2),
        StopKey::Via(3),
        StopKey::Via(4),
        StopKey::Via(5),
        StopKey::Destination,
    ];
}

impl std::fmt::Display for StopKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopKey::Pickup => write!(f, "pickup"),
            StopKey::Via(n) => write!(f, "via{n}"),
            StopKey::Destination => write!(f, "destination"),
        }
    }
}

/// Canonical booking record extracted from email or chat text.
///
/// Invariant (after [`ExtractedJob::compact_vias`]): either no destination is
/// set, or the destination is set with 0–5 via points preceding it, and via
/// points are contiguous from `via1` upward with no gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedJob {
    /// Normalized to `DD/MM/YYYY`.
    pub date: Option<String>,
    /// Normalized to `HH:MM` (24-hour).
    pub time: Option<String>,

    pub pickup: Option<String>,
    pub via1: Option<String>,
    pub via2: Option<String>,
    pub via3: Option<String>,
    pub via4: Option<String>,
    pub via5: Option<String>,
    pub destination: Option<String>,

    /// Per-stop passenger annotations shaped `"Name - phone1, phone2"`.
    pub pickup_note: Option<String>,
    pub via1_note: Option<String>,
    pub via2_note: Option<String>,
    pub via3_note: Option<String>,
    pub via4_note: Option<String>,
    pub via5_note: Option<String>,
    pub destination_note: Option<String>,

    pub customer_name: Option<String>,
    /// Comma-joined, deduplicated, `+44`-normalized.
    pub customer_phone: Option<String>,
    pub customer_reference: Option<String>,
    pub customer_account: Option<String>,

    pub passengers: Option<u32>,
    pub luggage: Option<u32>,
    pub vehicle_type: Option<String>,
    pub mobility_aids: Option<String>,
    pub flight_ref: Option<String>,

    #[serde(with = "rust_decimal::serde::str_option")]
    pub price: Option<Decimal>,
    pub job_number: Option<String>,
    /// Synthesized summary for the driver, e.g. `"MPV, 6 passengers, 4 luggage"`.
    pub driver_notes: Option<String>,
}

impl ExtractedJob {
    /// Returns the address text for a stop slot, if set.
    #[must_use]
    pub fn address(&self, key: StopKey) -> Option<&str> {
        match key {
            StopKey::Pickup => self.pickup.as_deref(),
            StopKey::Via(1) => self.via1.as_deref(),
            StopKey::Via(2) => self.via2.as_deref(),
            StopKey::Via(3) => self.via3.as_deref(),
            StopKey::Via(4) => self.via4.as_deref(),
            StopKey::Via(5) => self.via5.as_deref(),
            StopKey::Via(_) => None,
            StopKey::Destination => self.destination.as_deref(),
        }
    }

    /// Returns the passenger note for a stop slot, if set.
    #[must_use]
    pub fn note(&self, key: StopKey) -> Option<&str> {
        match key {
            StopKey::Pickup => self.pickup_note.as_deref(),
            StopKey::Via(1) => self.via1_note.as_deref(),
            StopKey::Via(2) => self.via2_note.as_deref(),
            StopKey::Via(3) => self.via3_note.as_deref(),
            StopKey::Via(4) => self.via4_note.as_deref(),
            StopKey::Via(5) => self.via5_note.as_deref(),
            StopKey::Via(_) => None,
            StopKey::Destination => self.destination_note.as_deref(),
        }
    }

    /// Sets the address for a via slot (1–5). Out-of-range slots are ignored.
    pub fn set_via(&mut self, n: u8, value: Option<String>) {
        match n {
            1 => self.via1 = value,
            2 => self.via2 = value,
            3 => self.via3 = value,
            4 => self.via4 = value,
            5 => self.via5 = value,
            _ => {}
        }
    }

    /// Sets the passenger note for a via slot (1–5). Out-of-range slots are ignored.
    pub fn set_via_note(&mut self, n: u8, value: Option<String>) {
        match n {
            1 => self.via1_note = value,
            2 => self.via2_note = value,
            3 => self.via3_note = value,
            4 => self.via4_note = value,
            5 => self.via5_note = value,
            _ => {}
        }
    }

    /// Populated via addresses in visit order.
    #[must_use]
    pub fn vias(&self) -> Vec<&str> {
        (1..=5)
            .filter_map(|n| self.address(StopKey::Via(n)))
            .collect()
    }

    /// Shifts via points down so they are contiguous from `via1` upward,
    /// carrying each via's note with it.
    pub fn compact_vias(&mut self) {
        let filled: Vec<(Option<String>, Option<String>)> = (1..=5)
            .filter_map(|n| {
                self.address(StopKey::Via(n)).map(|addr| {
                    (
                        Some(addr.to_owned()),
                        self.note(StopKey::Via(n)).map(str::to_owned),
                    )
                })
            })
            .collect();
        for n in 1..=5u8 {
            let (addr, note) = filled
                .get(usize::from(n) - 1)
                .cloned()
                .unwrap_or((None, None));
            self.set_via(n, addr);
            self.set_via_note(n, note);
        }
    }
}
