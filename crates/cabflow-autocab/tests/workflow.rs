//! Integration tests for the submission workflow using wiremock HTTP mocks.

use std::collections::HashMap;

use cabflow_autocab::{AutocabClient, SubmissionOptions, SubmissionOutcome, SubmissionWorkflow};
use cabflow_core::{ExtractedJob, StopKey};
use cabflow_geo::{fallback_zone, LatLng, ResolvedAddress};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AutocabClient {
    AutocabClient::with_base_url("test-key", 8, base_url)
        .expect("client construction should not fail")
        .with_retry_policy(0, 0)
}

fn resolved(text: &str) -> ResolvedAddress {
    ResolvedAddress {
        text: text.to_owned(),
        house: String::new(),
        street: text.to_owned(),
        town: "Chelmsford".to_owned(),
        postcode: "CM1 1AA".to_owned(),
        coordinate: LatLng {
            lat: 51.73,
            lng: 0.47,
        },
        zone: fallback_zone(),
    }
}

fn job() -> ExtractedJob {
    ExtractedJob {
        date: Some("15/07/2025".to_owned()),
        time: Some("09:30".to_owned()),
        pickup: Some("A Road".to_owned()),
        destination: Some("B Road".to_owned()),
        passengers: Some(2),
        luggage: Some(0),
        vehicle_type: Some("Saloon".to_owned()),
        job_number: Some("JB4471".to_owned()),
        ..ExtractedJob::default()
    }
}

fn stops() -> HashMap<StopKey, ResolvedAddress> {
    let mut map = HashMap::new();
    map.insert(StopKey::Pickup, resolved("A Road"));
    map.insert(StopKey::Destination, resolved("B Road"));
    map
}

#[tokio::test]
async fn duplicate_reference_short_circuits_with_zero_create_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/search"))
        .and(body_partial_json(serde_json::json!({ "yourReference": "JB4471" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bookings": [
                { "bookingId": 4242, "yourReferences": { "yourReference1": "JB4471" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/booking"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let workflow = SubmissionWorkflow::new(&client);
    let outcome = workflow
        .submit(&job(), &stops(), SubmissionOptions::default(), None)
        .await
        .expect("workflow should not error");

    match outcome {
        SubmissionOutcome::DuplicateDetected { existing } => {
            assert_eq!(existing.booking_id, 4242);
        }
        other => panic!("expected DuplicateDetected, got {other:?}"),
    }
}

#[tokio::test]
async fn non_matching_search_results_do_not_count_as_duplicates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bookings": [
                { "bookingId": 1, "yourReferences": { "yourReference1": "OTHER" } }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/booking"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "bookingId": 888 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let workflow = SubmissionWorkflow::new(&client);
    let outcome = workflow
        .submit(&job(), &stops(), SubmissionOptions::default(), None)
        .await
        .expect("workflow should not error");

    match outcome {
        SubmissionOutcome::Succeeded {
            booking_id,
            id_changed,
            ..
        } => {
            assert_eq!(booking_id, 888);
            assert!(!id_changed);
        }
        other => panic!("expected Succeeded, got {other:?}"),
    }
}

#[tokio::test]
async fn edit_of_vanished_booking_creates_replacement_with_changed_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/booking/v1/booking/500"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/booking"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "bookingId": 501 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let workflow = SubmissionWorkflow::new(&client);
    let outcome = workflow
        .submit(&job(), &stops(), SubmissionOptions::default(), Some(500))
        .await
        .expect("workflow should not error");

    match outcome {
        SubmissionOutcome::Succeeded {
            booking_id,
            id_changed,
            ..
        } => {
            assert_eq!(booking_id, 501);
            assert!(id_changed, "replacement must flag the id change");
        }
        other => panic!("expected Succeeded, got {other:?}"),
    }
}

#[tokio::test]
async fn edit_echoes_row_version_and_updates_in_place() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/booking/v1/booking/500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bookingId": 500,
            "rowVersion": 33,
            "archived": true
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/booking/v1/booking/500"))
        .and(body_partial_json(serde_json::json!({ "rowVersion": 33 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let workflow = SubmissionWorkflow::new(&client);
    let outcome = workflow
        .submit(&job(), &stops(), SubmissionOptions::default(), Some(500))
        .await
        .expect("workflow should not error");

    match outcome {
        SubmissionOutcome::Succeeded {
            booking_id,
            id_changed,
            ..
        } => {
            assert_eq!(booking_id, 500);
            assert!(!id_changed);
        }
        other => panic!("expected Succeeded, got {other:?}"),
    }
}

#[tokio::test]
async fn conflict_is_retried_once_with_override() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/booking/v1/booking/500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bookingId": 500,
            "rowVersion": 7
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/booking/v1/booking/500"))
        .and(query_param("override", "true"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/booking/v1/booking/500"))
        .respond_with(ResponseTemplate::new(406))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let workflow = SubmissionWorkflow::new(&client);
    let outcome = workflow
        .submit(&job(), &stops(), SubmissionOptions::default(), Some(500))
        .await
        .expect("workflow should not error");

    assert!(matches!(
        outcome,
        SubmissionOutcome::Succeeded {
            booking_id: 500,
            id_changed: false,
            ..
        }
    ));
}

#[tokio::test]
async fn failed_update_never_cancels_the_existing_booking() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/booking/v1/booking/500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "bookingId": 500,
            "rowVersion": 7
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/booking/v1/booking/500"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    // The cancel+recreate helper must never run on the default failure path.
    Mock::given(method("DELETE"))
        .and(path("/booking/v1/booking/500"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/booking"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let workflow = SubmissionWorkflow::new(&client);
    let outcome = workflow
        .submit(&job(), &stops(), SubmissionOptions::default(), Some(500))
        .await
        .expect("workflow should not error");

    match outcome {
        SubmissionOutcome::Failed { status, body } => {
            assert_eq!(status, Some(400));
            assert_eq!(body, "bad request");
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn seventeen_passengers_submit_three_sequential_groups() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/booking"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "bookingId": 600 })),
        )
        .expect(3)
        .mount(&server)
        .await;

    let mut big_job = job();
    big_job.passengers = Some(17);
    big_job.job_number = None; // skip the duplicate search

    let client = test_client(&server.uri());
    let workflow = SubmissionWorkflow::new(&client);
    let outcome = workflow
        .submit(&big_job, &stops(), SubmissionOptions::default(), None)
        .await
        .expect("workflow should not error");

    match outcome {
        SubmissionOutcome::Succeeded {
            groups_submitted,
            groups_failed,
            ..
        } => {
            assert_eq!(groups_submitted, 3);
            assert_eq!(groups_failed, 0);
        }
        other => panic!("expected Succeeded, got {other:?}"),
    }
}

#[tokio::test]
async fn partial_group_failure_still_reports_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/booking"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "bookingId": 700 })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/booking"))
        .respond_with(ResponseTemplate::new(400).set_body_string("vehicle capacity"))
        .mount(&server)
        .await;

    let mut big_job = job();
    big_job.passengers = Some(17);
    big_job.job_number = None;

    let client = test_client(&server.uri());
    let workflow = SubmissionWorkflow::new(&client);
    let outcome = workflow
        .submit(&big_job, &stops(), SubmissionOptions::default(), None)
        .await
        .expect("workflow should not error");

    match outcome {
        SubmissionOutcome::Succeeded {
            booking_id,
            groups_submitted,
            groups_failed,
            ..
        } => {
            assert_eq!(booking_id, 700);
            assert_eq!(groups_submitted, 1);
            assert_eq!(groups_failed, 2);
        }
        other => panic!("expected partial success, got {other:?}"),
    }
}

#[tokio::test]
async fn replace_booking_is_an_explicit_delete_then_create() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/booking/v1/booking/500"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/booking"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "bookingId": 900 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let workflow = SubmissionWorkflow::new(&client);
    let outcome = workflow
        .replace_booking(500, &job(), &stops(), SubmissionOptions::default())
        .await
        .expect("workflow should not error");

    match outcome {
        SubmissionOutcome::Succeeded {
            booking_id,
            id_changed,
            ..
        } => {
            assert_eq!(booking_id, 900);
            assert!(id_changed);
        }
        other => panic!("expected Succeeded, got {other:?}"),
    }
}
