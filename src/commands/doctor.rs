// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::require_trip;
use crate::models::{AccommodationStatus, EventStatus, FlightStatus};
use crate::store::RecordStore;
use crate::utils::{is_malformed_cost, pretty_table};
use anyhow::Result;
use rusqlite::{Connection, params};
use std::collections::HashSet;

pub fn handle(conn: &Connection, store: &dyn RecordStore, m: &clap::ArgMatches) -> Result<()> {
    let trip_id = m.get_one::<String>("trip").unwrap().trim();
    let rows = find_issues(conn, store, trip_id)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Data the budget would read as zero or skip without saying so.
pub fn find_issues(
    conn: &Connection,
    store: &dyn RecordStore,
    trip_id: &str,
) -> Result<Vec<Vec<String>>> {
    require_trip(conn, trip_id)?;
    let mut rows = Vec::new();
    let mut cost = |what: &str, id: &str, field: &str, v: Option<&str>| {
        if is_malformed_cost(v) {
            rows.push(vec![
                "unparseable_cost".into(),
                format!("{} {} {}='{}'", what, id, field, v.unwrap_or_default()),
            ]);
        }
    };

    // 1) Cost text that would count as zero
    let accommodations = store.fetch_accommodations(trip_id)?;
    for a in &accommodations {
        cost("accommodation", &a.id, "cost_per_night", a.cost_per_night.as_deref());
        cost("accommodation", &a.id, "total_cost", a.total_cost.as_deref());
    }
    let destination_ids: Vec<String> = store
        .fetch_destinations(trip_id)?
        .into_iter()
        .map(|d| d.id)
        .collect();
    let events = store.fetch_events_by_destination_ids(&destination_ids)?;
    for e in &events {
        cost("event", &e.id, "total_cost", e.total_cost.as_deref());
    }
    for b in &store.fetch_manual_budget_items(trip_id)? {
        cost("budget_item", &b.id, "estimated_cost", b.estimated_cost.as_deref());
        cost("budget_item", &b.id, "actual_cost", b.actual_cost.as_deref());
    }
    for a in &store.fetch_category_allocations(trip_id)? {
        cost("allocation", &a.category, "amount", a.amount.as_deref());
    }

    // 2) Status values no budget rule recognizes
    for a in &accommodations {
        if AccommodationStatus::parse(&a.status) == AccommodationStatus::Unknown {
            rows.push(vec![
                "unknown_status".into(),
                format!("accommodation {} '{}'", a.id, a.status),
            ]);
        }
    }
    for e in &events {
        if EventStatus::parse(&e.status) == EventStatus::Unknown {
            rows.push(vec![
                "unknown_status".into(),
                format!("event {} '{}'", e.id, e.status),
            ]);
        }
    }
    // Flight options are read directly: the store only serves budgeted statuses.
    let mut stmt = conn.prepare(
        "SELECT o.id, o.status, o.total_price FROM flight_options o
         JOIN flight_searches s ON o.flight_search_id=s.id
         WHERE s.trip_id=?1 ORDER BY o.rowid",
    )?;
    let mut cur = stmt.query(params![trip_id])?;
    while let Some(r) = cur.next()? {
        let id: String = r.get(0)?;
        let status: String = r.get(1)?;
        let price: Option<String> = r.get(2)?;
        if FlightStatus::parse(&status) == FlightStatus::Unknown {
            rows.push(vec![
                "unknown_status".into(),
                format!("flight_option {} '{}'", id, status),
            ]);
        }
        if is_malformed_cost(price.as_deref()) {
            rows.push(vec![
                "unparseable_cost".into(),
                format!("flight_option {} total_price='{}'", id, price.unwrap_or_default()),
            ]);
        }
    }

    // 3) Itinerary links to records that do not exist
    let acc_ids: HashSet<&str> = accommodations.iter().map(|a| a.id.as_str()).collect();
    let event_ids: HashSet<&str> = events.iter().map(|e| e.id.as_str()).collect();
    for it in store.fetch_itinerary_entries(trip_id)? {
        if let Some(a) = it.accommodation_id.as_deref().filter(|a| !acc_ids.contains(a)) {
            rows.push(vec![
                "dangling_itinerary_link".into(),
                format!("entry {} -> accommodation {}", it.id, a),
            ]);
        }
        if let Some(e) = it.event_id.as_deref().filter(|e| !event_ids.contains(e)) {
            rows.push(vec![
                "dangling_itinerary_link".into(),
                format!("entry {} -> event {}", it.id, e),
            ]);
        }
    }
    Ok(rows)
}
