//! Integration tests for `AutocabClient` using wiremock HTTP mocks.

use cabflow_autocab::{AutocabClient, AutocabError};
use chrono::NaiveDate;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AutocabClient {
    AutocabClient::with_base_url("test-key", 8, base_url)
        .expect("client construction should not fail")
        .with_retry_policy(0, 0)
}

#[tokio::test]
async fn get_booking_returns_parsed_booking() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "bookingId": 12345,
        "rowVersion": 9,
        "archived": false,
        "yourReferences": { "yourReference1": "JB4471", "yourReference2": "ACME01" },
        "pickupDueTime": "2025-07-15T09:30:00.000",
        "name": "David Hart"
    });

    Mock::given(method("GET"))
        .and(path("/booking/v1/booking/12345"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let booking = client.get_booking(12345).await.expect("should parse booking");

    assert_eq!(booking.booking_id, 12345);
    assert_eq!(booking.row_version, Some(9));
    assert_eq!(
        booking
            .your_references
            .expect("references")
            .your_reference1
            .as_deref(),
        Some("JB4471")
    );
}

#[tokio::test]
async fn get_booking_maps_404_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/booking/v1/booking/777"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get_booking(777).await.expect_err("should be 404");
    assert!(matches!(err, AutocabError::NotFound(777)));
}

#[tokio::test]
async fn search_posts_reference_and_window() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "bookings": [
            { "bookingId": 99, "yourReferences": { "yourReference1": "JB4471" } }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/booking/v1/search"))
        .and(body_partial_json(serde_json::json!({
            "yourReference": "JB4471",
            "from": "2025-04-15T00:00:00.000",
            "to": "2026-01-15T23:59:00.000"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let from = NaiveDate::from_ymd_opt(2025, 4, 15).expect("valid date");
    let to = NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date");
    let bookings = client
        .search_by_reference("JB4471", from, to)
        .await
        .expect("should search");

    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].booking_id, 99);
}

#[tokio::test]
async fn update_maps_406_to_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/booking/v1/booking/55"))
        .respond_with(ResponseTemplate::new(406))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let submission = sample_submission();
    let err = client
        .update_booking(55, &submission, false)
        .await
        .expect_err("should conflict");
    assert!(matches!(err, AutocabError::Conflict(55)));
}

#[tokio::test]
async fn update_override_adds_query_parameter() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/booking/v1/booking/55"))
        .and(query_param("override", "true"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let submission = sample_submission();
    client
        .update_booking(55, &submission, true)
        .await
        .expect("override update should succeed");
}

#[tokio::test]
async fn zone_lookup_parses_zone_and_maps_404_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/address/v1/zone"))
        .and(body_partial_json(serde_json::json!({ "text": "High Street, Chelmsford" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 12,
            "name": "City Centre",
            "descriptor": "CC"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let zone = client
        .zone_for_address("High Street, Chelmsford")
        .await
        .expect("should resolve")
        .expect("should have zone");
    assert_eq!(zone.id, 12);
    assert_eq!(zone.descriptor, "CC");

    let missing = client
        .zone_for_address("unknown address")
        .await
        .expect("404 is not an error");
    assert_eq!(missing, None);
}

#[tokio::test]
async fn transient_server_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/booking"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/booking"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "bookingId": 321 })),
        )
        .mount(&server)
        .await;

    let client = AutocabClient::with_base_url("test-key", 8, &server.uri())
        .expect("client construction should not fail")
        .with_retry_policy(2, 0);
    let submission = sample_submission();
    let id = client
        .create_booking(&submission)
        .await
        .expect("should succeed after retries");
    assert_eq!(id, 321);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/booking/v1/booking"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad payload"))
        .expect(1)
        .mount(&server)
        .await;

    let client = AutocabClient::with_base_url("test-key", 8, &server.uri())
        .expect("client construction should not fail")
        .with_retry_policy(3, 0);
    let submission = sample_submission();
    let err = client
        .create_booking(&submission)
        .await
        .expect_err("400 should fail immediately");
    assert!(
        matches!(err, AutocabError::UnexpectedStatus { status: 400, ref body } if body == "bad payload")
    );
}

fn sample_submission() -> cabflow_autocab::BookingSubmission {
    use cabflow_autocab::{BookingStop, StopType};
    use cabflow_geo::{fallback_zone, LatLng, ResolvedAddress};

    let address = ResolvedAddress {
        text: "12 Mill Lane, Witham CM8 1AB".to_owned(),
        house: "12".to_owned(),
        street: "Mill Lane".to_owned(),
        town: "Witham".to_owned(),
        postcode: "CM8 1AB".to_owned(),
        coordinate: LatLng {
            lat: 51.8,
            lng: 0.64,
        },
        zone: fallback_zone(),
    };

    cabflow_autocab::BookingSubmission {
        pickup_due_time: "2025-07-15T09:30:00.000".to_owned(),
        name: Some("Pat Reed".to_owned()),
        telephone_number: Some("+447700900010".to_owned()),
        passengers: 2,
        luggage: 0,
        vehicle_type: Some("Saloon".to_owned()),
        driver_note: None,
        pickup: BookingStop {
            address: address.clone(),
            note: None,
            passenger_details_index: None,
            stop_type: StopType::Pickup,
        },
        vias: Vec::new(),
        destination: Some(BookingStop {
            address,
            note: None,
            passenger_details_index: None,
            stop_type: StopType::Destination,
        }),
        extra_passenger_details: Vec::new(),
        pricing: None,
        your_references: cabflow_autocab::types::YourReferences::default(),
        row_version: None,
    }
}
