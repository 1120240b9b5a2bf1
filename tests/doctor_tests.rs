// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde_json::json;
use tempfile::tempdir;
use tripclip::commands::{doctor::find_issues, importer::load_snapshot};
use tripclip::db::{SqliteStore, open_or_init};
use tripclip::models::TripSnapshot;

#[test]
fn doctor_flags_silent_budget_gaps() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trips.sqlite");
    let mut conn = open_or_init(&path).unwrap();
    let snap: TripSnapshot = serde_json::from_value(json!({
        "trip": { "id": "T1", "name": "Rome" },
        "accommodations": [
            { "id": "A1", "name": "B&B", "status": "pending", "totalCost": "1.200,00" }
        ],
        "destinations": [ { "id": "D1", "name": "Rome" } ],
        "events": [
            { "id": "E1", "destinationId": "D1", "name": "Vatican", "status": "booked",
              "totalCost": "35" }
        ],
        "flightSearches": [ { "id": "S1" } ],
        "flightOptions": [
            { "id": "F1", "flightSearchId": "S1", "airline": "ITA",
              "departureAirport": "BOS", "arrivalAirport": "FCO",
              "status": "on hold", "totalPrice": "about 700" }
        ],
        "budgetItems": [
            { "id": "M1", "category": "food", "description": "Gelato", "estimatedCost": "€5" }
        ],
        "itinerary": [
            { "id": "I1", "accommodationId": "A1" },
            { "id": "I2", "eventId": "E404" }
        ]
    }))
    .unwrap();
    load_snapshot(&mut conn, &snap).unwrap();

    let store = SqliteStore::new(&path);
    let issues: Vec<String> = find_issues(&conn, &store, "T1")
        .unwrap()
        .into_iter()
        .map(|r| format!("{}: {}", r[0], r[1]))
        .collect();

    assert!(issues.contains(&"unparseable_cost: accommodation A1 total_cost='1.200,00'".to_string()));
    assert!(issues.contains(&"unparseable_cost: budget_item M1 estimated_cost='€5'".to_string()));
    assert!(issues.contains(&"unparseable_cost: flight_option F1 total_price='about 700'".to_string()));
    assert!(issues.contains(&"unknown_status: accommodation A1 'pending'".to_string()));
    assert!(issues.contains(&"unknown_status: flight_option F1 'on hold'".to_string()));
    assert!(issues.contains(&"dangling_itinerary_link: entry I2 -> event E404".to_string()));
    assert_eq!(issues.len(), 6);
}

#[test]
fn doctor_requires_existing_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trips.sqlite");
    let conn = open_or_init(&path).unwrap();
    let store = SqliteStore::new(&path);
    let err = find_issues(&conn, &store, "missing").unwrap_err();
    assert!(err.to_string().contains("Trip 'missing' not found"));
}
