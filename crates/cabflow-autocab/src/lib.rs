//! Client and submission workflow for the external AUTOCAB booking system.
//!
//! [`AutocabClient`] wraps the REST API with typed errors and bounded
//! retries. [`payload`] maps a canonical [`cabflow_core::ExtractedJob`] and
//! its resolved addresses into the system's submission schema.
//! [`SubmissionWorkflow`] drives create/edit with duplicate detection, the
//! update-first/404-fallback edit policy, and sequential passenger-group
//! splitting.

pub mod client;
pub mod error;
pub mod payload;
mod retry;
pub mod submit;
pub mod types;

pub use client::AutocabClient;
pub use error::AutocabError;
pub use payload::{build_submission, split_passenger_groups, SubmissionOptions, MAX_GROUP_SIZE};
pub use submit::{SubmissionOutcome, SubmissionWorkflow};
pub use types::{Booking, BookingStop, BookingSubmission, PassengerDetail, PricingBlock, StopType};
