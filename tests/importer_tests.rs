// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use std::io::Write;
use tempfile::NamedTempFile;
use tripclip::{cli, commands::importer, db};

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn write_snapshot(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", body).unwrap();
    file.flush().unwrap();
    file
}

fn run_import(conn: &mut Connection, path: &str) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["tripclip", "import", "trip", "--path", path]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(conn, import_m)
    } else {
        panic!("no import subcommand");
    }
}

const SNAPSHOT: &str = r#"{
    "trip": { "id": "T1", "name": "Kyoto", "startDate": "2025-04-01", "currency": "JPY" },
    "accommodations": [
        { "id": "A1", "name": "Ryokan", "status": "booked", "costPerNight": 18000, "currency": "JPY" }
    ],
    "destinations": [ { "id": "D1", "name": "Kyoto" } ],
    "events": [
        { "id": "E1", "destinationId": "D1", "name": "Tea ceremony", "status": "booked",
          "totalCost": "4500", "currency": "JPY" }
    ],
    "flightSearches": [ { "id": "S1" } ],
    "flightOptions": [
        { "id": "F1", "flightSearchId": "S1", "airline": "ANA", "departureAirport": "SFO",
          "arrivalAirport": "KIX", "status": "booked", "totalPrice": "980.10", "currency": "USD" }
    ],
    "budgetItems": [
        { "id": "M1", "category": "transport", "description": "JR pass", "actualCost": "50000" }
    ],
    "itinerary": [
        { "id": "I1", "date": "2025-04-01", "accommodationId": "A1" },
        { "id": "I2", "date": "2025-04-02", "accommodationId": "A1" }
    ],
    "allocations": [ { "category": "transport", "amount": "60000" } ]
}"#;

#[test]
fn import_trims_path_and_loads_every_collection() {
    let mut conn = base_conn();
    let file = write_snapshot(SNAPSHOT);
    let padded = format!("  {}  ", file.path().to_str().unwrap());
    run_import(&mut conn, &padded).unwrap();

    for (table, expected) in [
        ("trips", 1),
        ("accommodations", 1),
        ("destinations", 1),
        ("events", 1),
        ("flight_searches", 1),
        ("flight_options", 1),
        ("budget_items", 1),
        ("itinerary_items", 2),
        ("budget_allocations", 1),
    ] {
        let n: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, expected, "{}", table);
    }
    let rate: String = conn
        .query_row(
            "SELECT cost_per_night FROM accommodations WHERE id='A1'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(rate, "18000");
}

#[test]
fn reimport_updates_in_place() {
    let mut conn = base_conn();
    let file = write_snapshot(SNAPSHOT);
    let path = file.path().to_str().unwrap().to_string();
    run_import(&mut conn, &path).unwrap();

    let changed = SNAPSHOT
        .replace(
            r#""name": "Tea ceremony", "status": "booked""#,
            r#""name": "Tea ceremony", "status": "attended""#,
        )
        .replace(r#""totalCost": "4500""#, r#""totalCost": "5000""#);
    let file2 = write_snapshot(&changed);
    run_import(&mut conn, file2.path().to_str().unwrap()).unwrap();

    let (status, cost): (String, String) = conn
        .query_row("SELECT status, total_cost FROM events WHERE id='E1'", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .unwrap();
    assert_eq!(status, "attended");
    assert_eq!(cost, "5000");
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM itinerary_items", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 2);
}

#[test]
fn import_rejects_unknown_destination_and_rolls_back() {
    let mut conn = base_conn();
    let bad = SNAPSHOT.replace(r#""destinationId": "D1""#, r#""destinationId": "D404""#);
    let file = write_snapshot(&bad);
    let err = run_import(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("unknown destination 'D404'"));
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM trips", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}

#[test]
fn import_rejects_doubly_linked_itinerary_entry() {
    let mut conn = base_conn();
    let bad = SNAPSHOT.replace(
        r#"{ "id": "I2", "date": "2025-04-02", "accommodationId": "A1" }"#,
        r#"{ "id": "I2", "date": "2025-04-02", "accommodationId": "A1", "eventId": "E1" }"#,
    );
    let file = write_snapshot(&bad);
    let err = run_import(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("links both"));
}

#[test]
fn import_reports_malformed_json() {
    let mut conn = base_conn();
    let file = write_snapshot("{ not json");
    let err = run_import(&mut conn, file.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("Parse snapshot"));
}

#[test]
fn import_refuses_ids_owned_by_another_trip() {
    let mut conn = base_conn();
    let file = write_snapshot(SNAPSHOT);
    run_import(&mut conn, file.path().to_str().unwrap()).unwrap();

    let other = r#"{
        "trip": { "id": "T2", "name": "Osaka" },
        "destinations": [ { "id": "D2", "name": "Osaka" } ],
        "events": [
            { "id": "E1", "destinationId": "D2", "name": "Street food tour",
              "status": "booked", "totalCost": "3000" }
        ]
    }"#;
    let file2 = write_snapshot(other);
    let err = run_import(&mut conn, file2.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("Event 'E1' belongs to trip 'T1'"));

    let dest: String = conn
        .query_row("SELECT destination_id FROM events WHERE id='E1'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(dest, "D1");
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM trips WHERE id='T2'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);

    let stolen = other
        .replace(r#""T2""#, r#""T3""#)
        .replace(r#""events": ["#, r#""accommodations": [ { "id": "A1", "name": "Inn", "status": "booked" } ], "events": ["#)
        .replace(r#""id": "E1""#, r#""id": "E2""#);
    let file3 = write_snapshot(&stolen);
    let err = run_import(&mut conn, file3.path().to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("Accommodation 'A1' belongs to trip 'T1'"));
}
