//! Rule-based extraction of booking fields from raw email text.
//!
//! [`extract`] turns a free-form booking email into a canonical
//! [`cabflow_core::ExtractedJob`]. Extraction is total: a field that cannot
//! be read is left absent, never an error. Every field is driven by an
//! ordered list of patterns with first-match-wins semantics.

pub mod extract;
pub mod fields;
pub mod rules;
pub mod stops;

pub use extract::extract;
pub use stops::StopSection;
