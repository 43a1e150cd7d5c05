use super::*;
use rust_decimal::Decimal;

const GROUP_EMAIL: &str = "\
BOOKING CONFIRMATION

Date: 15 July 2025
Job No: JB4471
Account: ACME01

1ST PICK UP: 09:30
ADDRESS: 12 Ongar Road, Upminster, Essex RM14 2AB
NAME: Sarah Collins
PHONE: 07700 900123
PASSENGERS: 2

PICK UP 10:15
ADDRESS: 3 Mill Lane, Brentwood CM14 4BX
NAME: David Hart
PHONE: 07700 900456 / 01277 219000
PASSENGERS: 4

DROP OFF
ADDRESS: Terminal 2, Heathrow Airport TW6 1EW

VEHICLE: MPV
LUGGAGE: 4
Flight No: BA123
Job Price: £145.00
Total Price: £174.00
";

#[test]
fn worked_example_extracts_expected_fields() {
    let job = extract(GROUP_EMAIL);

    assert_eq!(job.date.as_deref(), Some("15/07/2025"));
    assert_eq!(job.time.as_deref(), Some("09:30"));
    assert_eq!(
        job.pickup.as_deref(),
        Some("12 Ongar Road, Upminster, Essex RM14 2AB")
    );
    assert_eq!(job.via1.as_deref(), Some("3 Mill Lane, Brentwood CM14 4BX"));
    assert_eq!(
        job.destination.as_deref(),
        Some("Terminal 2, Heathrow Airport TW6 1EW")
    );
    // The 4-passenger section's contact wins over the 2-passenger one.
    assert_eq!(job.customer_name.as_deref(), Some("David Hart"));
    assert_eq!(
        job.customer_phone.as_deref(),
        Some("+447700900123, +447700900456, +441277219000")
    );
    assert_eq!(job.passengers, Some(6));
    assert_eq!(job.luggage, Some(4));
    assert_eq!(job.vehicle_type.as_deref(), Some("MPV"));
    assert_eq!(job.price, Some(Decimal::new(14500, 2)));
    assert_eq!(job.job_number.as_deref(), Some("JB4471"));
    assert_eq!(job.customer_account.as_deref(), Some("ACME01"));
    assert_eq!(job.flight_ref.as_deref(), Some("BA123"));
}

#[test]
fn worked_example_builds_stop_notes() {
    let job = extract(GROUP_EMAIL);
    assert_eq!(
        job.pickup_note.as_deref(),
        Some("Sarah Collins - +447700900123")
    );
    assert_eq!(
        job.via1_note.as_deref(),
        Some("David Hart - +447700900456, +441277219000")
    );
    // The drop-off section has no NAME/PHONE, so no note — absent, not empty.
    assert_eq!(job.destination_note, None);
}

#[test]
fn extraction_is_idempotent() {
    let first = extract(GROUP_EMAIL);
    let second = extract(GROUP_EMAIL);
    assert_eq!(first, second);
}

#[test]
fn stops_are_ordered_by_time_not_document_order() {
    let email = "\
PICK UP 10:05
ADDRESS: B Road, Chelmsford CM1 1BB

PICK UP 09:40
ADDRESS: A Road, Chelmsford CM1 1AA

DROP OFF 11:15
ADDRESS: C Road, Chelmsford CM1 1CC
";
    let job = extract(email);
    assert_eq!(job.pickup.as_deref(), Some("A Road, Chelmsford CM1 1AA"));
    assert_eq!(job.via1.as_deref(), Some("B Road, Chelmsford CM1 1BB"));
    assert_eq!(job.destination.as_deref(), Some("C Road, Chelmsford CM1 1CC"));
    assert_eq!(job.time.as_deref(), Some("09:40"));
}

#[test]
fn customer_comes_from_most_populated_section() {
    let email = "\
PICK UP 08:00
ADDRESS: 1 First Street
NAME: Minor Contact
PHONE: 07700 900001
PASSENGERS: 2

PICK UP 09:00
ADDRESS: 2 Second Street
NAME: Major Contact
PHONE: 07700 900002
PASSENGERS: 5

DROP OFF 10:00
ADDRESS: 3 Third Street
";
    let job = extract(email);
    assert_eq!(job.customer_name.as_deref(), Some("Major Contact"));
}

#[test]
fn tied_passenger_counts_pick_the_earlier_section() {
    let email = "\
PICK UP 09:00
ADDRESS: 2 Second Street
NAME: Later Contact
PHONE: 07700 900002
PASSENGERS: 3

PICK UP 08:00
ADDRESS: 1 First Street
NAME: Earlier Contact
PHONE: 07700 900001
PASSENGERS: 3

DROP OFF 10:00
ADDRESS: 3 Third Street
";
    let job = extract(email);
    assert_eq!(job.customer_name.as_deref(), Some("Earlier Contact"));
}

#[test]
fn customer_falls_back_to_first_name_line() {
    let email = "\
Pick up: 12 Mill Lane, Witham CM8 1AB
Drop off: High Street, Chelmsford CM1 1BE
Name: Pat Reed
Phone: 07700 900010
";
    let job = extract(email);
    assert_eq!(job.customer_name.as_deref(), Some("Pat Reed"));
    assert_eq!(job.pickup.as_deref(), Some("12 Mill Lane, Witham CM8 1AB"));
    assert_eq!(
        job.destination.as_deref(),
        Some("High Street, Chelmsford CM1 1BE")
    );
}

#[test]
fn excess_stops_keep_five_vias_plus_destination() {
    let mut email = String::from("Date: 15 July 2025\n\n");
    for (i, hour) in (8..16).enumerate() {
        email.push_str(&format!(
            "PICK UP {hour:02}:00\nADDRESS: {n} Stop Street, Chelmsford CM1 1A{n}\n\n",
            n = i + 1
        ));
    }
    email.push_str("DROP OFF 17:00\nADDRESS: 99 Final Road, Chelmsford CM2 9ZZ\n");

    let job = extract(&email);
    assert_eq!(job.pickup.as_deref(), Some("1 Stop Street, Chelmsford CM1 1A1"));
    assert_eq!(job.via5.as_deref(), Some("6 Stop Street, Chelmsford CM1 1A6"));
    assert_eq!(
        job.destination.as_deref(),
        Some("99 Final Road, Chelmsford CM2 9ZZ")
    );
}

#[test]
fn defaults_apply_when_fields_are_missing() {
    let job = extract("no booking content here");
    assert_eq!(job.passengers, Some(1));
    assert_eq!(job.luggage, Some(0));
    assert_eq!(job.vehicle_type.as_deref(), Some("Saloon"));
    assert_eq!(job.pickup, None);
    assert_eq!(job.destination, None);
    assert_eq!(job.date, None);
    assert_eq!(job.customer_phone, None);
}

#[test]
fn mobility_aids_survive_when_genuine() {
    let email = "\
Pick up: 12 Mill Lane, Witham CM8 1AB
Drop off: Broomfield Hospital, Chelmsford CM1 7ET
Mobility: wheelchair
Passengers: 2
";
    let job = extract(email);
    assert_eq!(job.mobility_aids.as_deref(), Some("wheelchair"));
    assert_eq!(
        job.driver_notes.as_deref(),
        Some("Saloon, 2 passengers, 0 luggage, wheelchair")
    );
}

#[test]
fn driver_notes_include_flight_reference() {
    let job = extract(GROUP_EMAIL);
    assert_eq!(
        job.driver_notes.as_deref(),
        Some("MPV, 6 passengers, 4 luggage, BA123")
    );
}
