// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use serde_json::json;
use tempfile::{TempDir, tempdir};
use tripclip::commands::{exporter, importer::load_snapshot};
use tripclip::db::{SqliteStore, open_or_init};
use tripclip::{cli, models::TripSnapshot};

fn setup() -> (TempDir, Connection, SqliteStore) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trips.sqlite");
    let mut conn = open_or_init(&path).unwrap();
    let snap: TripSnapshot = serde_json::from_value(json!({
        "trip": { "id": "T1", "name": "Oslo", "currency": "NOK" },
        "accommodations": [
            { "id": "A1", "name": "Harbour hotel", "status": "booked",
              "costPerNight": "1200", "currency": "NOK" }
        ],
        "budgetItems": [
            { "id": "M1", "category": "food", "description": "Fish market",
              "estimatedCost": "300", "actualCost": "280", "date": "2025-06-02" }
        ],
        "itinerary": [
            { "id": "I1", "accommodationId": "A1" },
            { "id": "I2", "accommodationId": "A1" }
        ]
    }))
    .unwrap();
    load_snapshot(&mut conn, &snap).unwrap();
    (dir, conn, SqliteStore::new(path))
}

fn run_export(
    conn: &Connection,
    store: &SqliteStore,
    format: &str,
    out: &str,
) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "tripclip", "export", "budget", "--trip", "T1", "--format", format, "--out", out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, store, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_budget_writes_csv_rows() {
    let (dir, conn, store) = setup();
    let out_path = dir.path().join("budget.csv");
    run_export(&conn, &store, "csv", &out_path.to_string_lossy()).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "accommodation");
    assert_eq!(&rows[0][1], "A1");
    assert_eq!(&rows[0][5], "2400");
    assert_eq!(&rows[0][8], "true");
    assert!(rows[0][9].starts_with("2 nights"));
    assert_eq!(&rows[1][0], "manual");
    assert_eq!(&rows[1][5], "300");
    assert_eq!(&rows[1][6], "280");
}

#[test]
fn export_budget_writes_summary_json() {
    let (dir, conn, store) = setup();
    let out_path = dir.path().join("budget.json");
    run_export(&conn, &store, "JSON", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["grandTotal"]["estimated"].as_f64(), Some(2700.0));
    assert_eq!(parsed["grandTotal"]["actual"].as_f64(), Some(2680.0));
    assert_eq!(parsed["manual"]["items"][0]["description"], "Fish market");
}

#[test]
fn export_budget_rejects_unknown_format() {
    let (dir, conn, store) = setup();
    let out_path = dir.path().join("budget.xml");
    assert!(run_export(&conn, &store, "xml", &out_path.to_string_lossy()).is_err());
    assert!(!out_path.exists());
}
