//! The booking submission workflow.
//!
//! State machine: `New → Searching → {Creating | Updating} → {Succeeded |
//! DuplicateDetected | Failed}`.
//!
//! Create path: a reference search runs first and an exact job-number match
//! short-circuits to [`SubmissionOutcome::DuplicateDetected`] before any
//! create call. Edit path: the current booking is fetched for its
//! concurrency token, then updated in place; a 404 falls through to
//! create-as-replacement, a 406 is retried once with the explicit override
//! parameter, and any other failure leaves the existing booking untouched.
//! Cancel+recreate exists only as the opt-in [`SubmissionWorkflow::replace_booking`].

use std::collections::HashMap;

use cabflow_core::{ExtractedJob, StopKey};
use cabflow_geo::ResolvedAddress;
use chrono::{Local, Months};
use uuid::Uuid;

use crate::client::AutocabClient;
use crate::error::AutocabError;
use crate::payload::{build_submission, split_passenger_groups, SubmissionOptions};
use crate::types::{Booking, BookingSubmission};

/// How far back the duplicate search window reaches.
const SEARCH_WINDOW_BACK_MONTHS: u32 = 3;

/// How far ahead the duplicate search window reaches.
const SEARCH_WINDOW_AHEAD_MONTHS: u32 = 6;

/// Terminal result of one submission attempt.
#[derive(Debug)]
pub enum SubmissionOutcome {
    Succeeded {
        booking_id: i64,
        /// `true` only when an edit fell through to create-as-replacement.
        id_changed: bool,
        groups_submitted: usize,
        groups_failed: usize,
    },
    /// A booking with the same job-number reference already exists; carries
    /// the conflicting record for caller-driven resolution.
    DuplicateDetected { existing: Booking },
    /// The external system rejected the request; the existing booking (if
    /// any) is untouched.
    Failed { status: Option<u16>, body: String },
}

/// Drives create/edit submissions against the booking system.
pub struct SubmissionWorkflow<'a> {
    client: &'a AutocabClient,
}

impl<'a> SubmissionWorkflow<'a> {
    #[must_use]
    pub fn new(client: &'a AutocabClient) -> Self {
        Self { client }
    }

    /// Submits a booking, creating or editing depending on `existing_id`.
    ///
    /// # Errors
    ///
    /// Transport-level failures ([`AutocabError::Http`],
    /// [`AutocabError::Deserialize`]) and invalid records propagate as
    /// errors; every external rejection is a [`SubmissionOutcome`] variant.
    pub async fn submit(
        &self,
        job: &ExtractedJob,
        resolved: &HashMap<StopKey, ResolvedAddress>,
        options: SubmissionOptions,
        existing_id: Option<i64>,
    ) -> Result<SubmissionOutcome, AutocabError> {
        let correlation = Uuid::new_v4();
        let submission = build_submission(job, resolved, options)?;
        match existing_id {
            Some(id) => self.update_existing(correlation, id, submission).await,
            None => self.create_new(correlation, job, submission).await,
        }
    }

    /// Explicit cancel+recreate escape hatch.
    ///
    /// This is deliberately NOT wired into [`SubmissionWorkflow::submit`]'s
    /// failure path: a failed edit must never change the booking id as a
    /// side effect. Callers opt in knowingly.
    ///
    /// # Errors
    ///
    /// As for [`SubmissionWorkflow::submit`]; the delete must succeed before
    /// the replacement create is attempted.
    pub async fn replace_booking(
        &self,
        existing_id: i64,
        job: &ExtractedJob,
        resolved: &HashMap<StopKey, ResolvedAddress>,
        options: SubmissionOptions,
    ) -> Result<SubmissionOutcome, AutocabError> {
        let correlation = Uuid::new_v4();
        tracing::warn!(
            %correlation,
            booking_id = existing_id,
            "explicit cancel+recreate requested"
        );
        let submission = build_submission(job, resolved, options)?;
        match self.client.delete_booking(existing_id).await {
            Ok(()) => {}
            Err(AutocabError::NotFound(_)) => {
                tracing::info!(booking_id = existing_id, "booking already gone before replace");
            }
            Err(AutocabError::UnexpectedStatus { status, body }) => {
                return Ok(SubmissionOutcome::Failed {
                    status: Some(status),
                    body,
                });
            }
            Err(other) => return Err(other),
        }
        match self.client.create_booking(&submission).await {
            Ok(new_id) => Ok(SubmissionOutcome::Succeeded {
                booking_id: new_id,
                id_changed: true,
                groups_submitted: 1,
                groups_failed: 0,
            }),
            Err(AutocabError::UnexpectedStatus { status, body }) => {
                Ok(SubmissionOutcome::Failed {
                    status: Some(status),
                    body,
                })
            }
            Err(other) => Err(other),
        }
    }

    async fn create_new(
        &self,
        correlation: Uuid,
        job: &ExtractedJob,
        submission: BookingSubmission,
    ) -> Result<SubmissionOutcome, AutocabError> {
        if let Some(duplicate) = self.find_duplicate(correlation, job).await? {
            return Ok(SubmissionOutcome::DuplicateDetected {
                existing: duplicate,
            });
        }

        let groups = split_passenger_groups(submission.passengers);
        let mut groups_submitted = 0usize;
        let mut groups_failed = 0usize;
        let mut first_id: Option<i64> = None;
        let mut last_failure: Option<(u16, String)> = None;

        // Sequential on purpose: the groups share one passenger-index table
        // and reduce one remaining-passengers total.
        for (group_number, size) in groups.iter().enumerate() {
            let mut group = submission.clone();
            group.passengers = *size;
            match self.client.create_booking(&group).await {
                Ok(id) => {
                    tracing::info!(
                        %correlation,
                        booking_id = id,
                        group = group_number + 1,
                        passengers = *size,
                        "booking group created"
                    );
                    groups_submitted += 1;
                    if first_id.is_none() {
                        first_id = Some(id);
                    }
                }
                Err(AutocabError::UnexpectedStatus { status, body }) => {
                    tracing::warn!(
                        %correlation,
                        group = group_number + 1,
                        status,
                        "booking group rejected"
                    );
                    groups_failed += 1;
                    last_failure = Some((status, body));
                }
                Err(other) => return Err(other),
            }
        }

        match first_id {
            // Partial success is still success, reported as such.
            Some(booking_id) => Ok(SubmissionOutcome::Succeeded {
                booking_id,
                id_changed: false,
                groups_submitted,
                groups_failed,
            }),
            None => {
                let (status, body) = last_failure
                    .map_or((None, "no passenger groups to submit".to_owned()), |(s, b)| {
                        (Some(s), b)
                    });
                Ok(SubmissionOutcome::Failed { status, body })
            }
        }
    }

    async fn find_duplicate(
        &self,
        correlation: Uuid,
        job: &ExtractedJob,
    ) -> Result<Option<Booking>, AutocabError> {
        let Some(reference) = job.job_number.as_deref() else {
            return Ok(None);
        };
        let today = Local::now().date_naive();
        let from = today
            .checked_sub_months(Months::new(SEARCH_WINDOW_BACK_MONTHS))
            .unwrap_or(today);
        let to = today
            .checked_add_months(Months::new(SEARCH_WINDOW_AHEAD_MONTHS))
            .unwrap_or(today);

        let existing = self.client.search_by_reference(reference, from, to).await?;
        let hit = existing.into_iter().find(|booking| {
            booking
                .your_references
                .as_ref()
                .and_then(|r| r.your_reference1.as_deref())
                == Some(reference)
        });
        if let Some(found) = &hit {
            tracing::info!(
                %correlation,
                reference,
                existing_id = found.booking_id,
                "duplicate reference found, refusing to create"
            );
        }
        Ok(hit)
    }

    async fn update_existing(
        &self,
        correlation: Uuid,
        booking_id: i64,
        mut submission: BookingSubmission,
    ) -> Result<SubmissionOutcome, AutocabError> {
        let current = match self.client.get_booking(booking_id).await {
            Ok(booking) => booking,
            Err(AutocabError::NotFound(_)) => {
                tracing::warn!(
                    %correlation,
                    booking_id,
                    "booking vanished before edit, creating replacement"
                );
                return self.create_replacement(correlation, submission).await;
            }
            Err(AutocabError::UnexpectedStatus { status, body }) => {
                return Ok(SubmissionOutcome::Failed {
                    status: Some(status),
                    body,
                });
            }
            Err(other) => return Err(other),
        };

        if current.archived == Some(true) {
            // Archived bookings still take direct updates.
            tracing::info!(%correlation, booking_id, "editing archived booking");
        }
        submission.row_version = current.row_version;

        match self.client.update_booking(booking_id, &submission, false).await {
            Ok(()) => Ok(success_in_place(booking_id)),
            Err(AutocabError::Conflict(_)) => {
                tracing::warn!(
                    %correlation,
                    booking_id,
                    "update rejected with 406, retrying once with override"
                );
                match self.client.update_booking(booking_id, &submission, true).await {
                    Ok(()) => Ok(success_in_place(booking_id)),
                    Err(AutocabError::Conflict(_)) => Ok(SubmissionOutcome::Failed {
                        status: Some(406),
                        body: "update rejected after override retry".to_owned(),
                    }),
                    Err(AutocabError::NotFound(_)) => {
                        self.create_replacement(correlation, submission).await
                    }
                    Err(AutocabError::UnexpectedStatus { status, body }) => {
                        Ok(SubmissionOutcome::Failed {
                            status: Some(status),
                            body,
                        })
                    }
                    Err(other) => Err(other),
                }
            }
            Err(AutocabError::NotFound(_)) => {
                self.create_replacement(correlation, submission).await
            }
            // No cancel+recreate here: the existing booking is preserved and
            // the failure is reported as-is.
            Err(AutocabError::UnexpectedStatus { status, body }) => {
                Ok(SubmissionOutcome::Failed {
                    status: Some(status),
                    body,
                })
            }
            Err(other) => Err(other),
        }
    }

    async fn create_replacement(
        &self,
        correlation: Uuid,
        mut submission: BookingSubmission,
    ) -> Result<SubmissionOutcome, AutocabError> {
        submission.row_version = None;
        match self.client.create_booking(&submission).await {
            Ok(new_id) => {
                tracing::info!(
                    %correlation,
                    booking_id = new_id,
                    "replacement booking created after 404"
                );
                Ok(SubmissionOutcome::Succeeded {
                    booking_id: new_id,
                    id_changed: true,
                    groups_submitted: 1,
                    groups_failed: 0,
                })
            }
            Err(AutocabError::UnexpectedStatus { status, body }) => {
                Ok(SubmissionOutcome::Failed {
                    status: Some(status),
                    body,
                })
            }
            Err(other) => Err(other),
        }
    }
}

fn success_in_place(booking_id: i64) -> SubmissionOutcome {
    SubmissionOutcome::Succeeded {
        booking_id,
        id_changed: false,
        groups_submitted: 1,
        groups_failed: 0,
    }
}
