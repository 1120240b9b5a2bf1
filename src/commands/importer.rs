// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::TripSnapshot;
use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::collections::HashSet;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("trip", sub)) => import_trip(conn, sub),
        _ => Ok(()),
    }
}

fn import_trip(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let raw = std::fs::read_to_string(path).with_context(|| format!("Open snapshot {}", path))?;
    let snapshot: TripSnapshot =
        serde_json::from_str(&raw).with_context(|| format!("Parse snapshot {}", path))?;
    load_snapshot(conn, &snapshot)?;
    println!(
        "Imported trip '{}' ({}) from {}: {} accommodations, {} events, {} flight options, {} budget items, {} itinerary entries",
        snapshot.trip.name,
        snapshot.trip.id,
        path,
        snapshot.accommodations.len(),
        snapshot.events.len(),
        snapshot.flight_options.len(),
        snapshot.budget_items.len(),
        snapshot.itinerary.len()
    );
    Ok(())
}

fn check_snapshot(s: &TripSnapshot) -> Result<()> {
    let destinations: HashSet<&str> = s.destinations.iter().map(|d| d.id.as_str()).collect();
    for e in &s.events {
        if !destinations.contains(e.destination_id.as_str()) {
            return Err(anyhow!(
                "Event '{}' references unknown destination '{}'",
                e.id,
                e.destination_id
            ));
        }
    }
    let searches: HashSet<&str> = s.flight_searches.iter().map(|f| f.id.as_str()).collect();
    for f in &s.flight_options {
        if !searches.contains(f.flight_search_id.as_str()) {
            return Err(anyhow!(
                "Flight option '{}' references unknown flight search '{}'",
                f.id,
                f.flight_search_id
            ));
        }
    }
    for it in &s.itinerary {
        if it.accommodation_id.is_some() && it.event_id.is_some() {
            return Err(anyhow!(
                "Itinerary entry '{}' links both an accommodation and an event",
                it.id
            ));
        }
    }
    Ok(())
}

fn ids<'a, T>(records: &'a [T], id: impl Fn(&'a T) -> &'a str) -> Vec<&'a str> {
    records.iter().map(id).collect()
}

/// Rejects record ids already held by a different trip.
fn check_owners(tx: &Transaction<'_>, s: &TripSnapshot) -> Result<()> {
    let groups = [
        (
            "Accommodation",
            "SELECT trip_id FROM accommodations WHERE id=?1",
            ids(&s.accommodations, |a| a.id.as_str()),
        ),
        (
            "Destination",
            "SELECT trip_id FROM destinations WHERE id=?1",
            ids(&s.destinations, |d| d.id.as_str()),
        ),
        (
            "Event",
            "SELECT d.trip_id FROM events e JOIN destinations d ON e.destination_id=d.id
             WHERE e.id=?1",
            ids(&s.events, |e| e.id.as_str()),
        ),
        (
            "Flight search",
            "SELECT trip_id FROM flight_searches WHERE id=?1",
            ids(&s.flight_searches, |f| f.id.as_str()),
        ),
        (
            "Flight option",
            "SELECT fs.trip_id FROM flight_options o
             JOIN flight_searches fs ON o.flight_search_id=fs.id WHERE o.id=?1",
            ids(&s.flight_options, |f| f.id.as_str()),
        ),
        (
            "Budget item",
            "SELECT trip_id FROM budget_items WHERE id=?1",
            ids(&s.budget_items, |b| b.id.as_str()),
        ),
        (
            "Itinerary entry",
            "SELECT trip_id FROM itinerary_items WHERE id=?1",
            ids(&s.itinerary, |it| it.id.as_str()),
        ),
    ];
    let trip_id = s.trip.id.as_str();
    for (kind, sql, ids) in groups {
        let mut stmt = tx.prepare(sql)?;
        for id in ids {
            let owner: Option<String> = stmt.query_row(params![id], |r| r.get(0)).optional()?;
            if let Some(other) = owner.filter(|o| o != trip_id) {
                bail!("{} '{}' belongs to trip '{}'", kind, id, other);
            }
        }
    }
    Ok(())
}

/// Writes a snapshot in one transaction. Records with an existing id are
/// updated in place; nothing outside the snapshot is removed. An id already
/// held by another trip fails the import.
pub fn load_snapshot(conn: &mut Connection, s: &TripSnapshot) -> Result<()> {
    check_snapshot(s)?;
    let trip_id = s.trip.id.as_str();
    let tx = conn.transaction()?;
    check_owners(&tx, s)?;

    tx.execute(
        "INSERT INTO trips(id, name, start_date, end_date, currency) VALUES (?1,?2,?3,?4,?5)
         ON CONFLICT(id) DO UPDATE SET name=excluded.name, start_date=excluded.start_date,
             end_date=excluded.end_date, currency=excluded.currency",
        params![
            trip_id,
            s.trip.name,
            s.trip.start_date,
            s.trip.end_date,
            s.trip.currency
        ],
    )?;

    for a in &s.accommodations {
        tx.execute(
            "INSERT INTO accommodations(id, trip_id, name, status, cost_per_night, total_cost, currency)
             VALUES (?1,?2,?3,?4,?5,?6,?7)
             ON CONFLICT(id) DO UPDATE SET trip_id=excluded.trip_id, name=excluded.name,
                 status=excluded.status, cost_per_night=excluded.cost_per_night,
                 total_cost=excluded.total_cost, currency=excluded.currency",
            params![
                a.id,
                trip_id,
                a.name,
                a.status,
                a.cost_per_night,
                a.total_cost,
                a.currency
            ],
        )
        .with_context(|| format!("Import accommodation '{}'", a.id))?;
    }

    for d in &s.destinations {
        tx.execute(
            "INSERT INTO destinations(id, trip_id, name) VALUES (?1,?2,?3)
             ON CONFLICT(id) DO UPDATE SET trip_id=excluded.trip_id, name=excluded.name",
            params![d.id, trip_id, d.name],
        )
        .with_context(|| format!("Import destination '{}'", d.id))?;
    }

    for e in &s.events {
        tx.execute(
            "INSERT INTO events(id, destination_id, name, status, total_cost, currency)
             VALUES (?1,?2,?3,?4,?5,?6)
             ON CONFLICT(id) DO UPDATE SET destination_id=excluded.destination_id,
                 name=excluded.name, status=excluded.status,
                 total_cost=excluded.total_cost, currency=excluded.currency",
            params![
                e.id,
                e.destination_id,
                e.name,
                e.status,
                e.total_cost,
                e.currency
            ],
        )
        .with_context(|| format!("Import event '{}'", e.id))?;
    }

    for f in &s.flight_searches {
        tx.execute(
            "INSERT INTO flight_searches(id, trip_id, origin, destination) VALUES (?1,?2,?3,?4)
             ON CONFLICT(id) DO UPDATE SET trip_id=excluded.trip_id, origin=excluded.origin,
                 destination=excluded.destination",
            params![f.id, trip_id, f.origin, f.destination],
        )
        .with_context(|| format!("Import flight search '{}'", f.id))?;
    }

    for f in &s.flight_options {
        tx.execute(
            "INSERT INTO flight_options(id, flight_search_id, airline, departure_airport,
                 arrival_airport, status, total_price, currency)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8)
             ON CONFLICT(id) DO UPDATE SET flight_search_id=excluded.flight_search_id,
                 airline=excluded.airline, departure_airport=excluded.departure_airport,
                 arrival_airport=excluded.arrival_airport, status=excluded.status,
                 total_price=excluded.total_price, currency=excluded.currency",
            params![
                f.id,
                f.flight_search_id,
                f.airline,
                f.departure_airport,
                f.arrival_airport,
                f.status,
                f.total_price,
                f.currency
            ],
        )
        .with_context(|| format!("Import flight option '{}'", f.id))?;
    }

    for b in &s.budget_items {
        tx.execute(
            "INSERT INTO budget_items(id, trip_id, category, description, estimated_cost, actual_cost, date)
             VALUES (?1,?2,?3,?4,?5,?6,?7)
             ON CONFLICT(id) DO UPDATE SET trip_id=excluded.trip_id, category=excluded.category,
                 description=excluded.description, estimated_cost=excluded.estimated_cost,
                 actual_cost=excluded.actual_cost, date=excluded.date",
            params![
                b.id,
                trip_id,
                b.category,
                b.description,
                b.estimated_cost,
                b.actual_cost,
                b.date
            ],
        )
        .with_context(|| format!("Import budget item '{}'", b.id))?;
    }

    for it in &s.itinerary {
        tx.execute(
            "INSERT INTO itinerary_items(id, trip_id, date, title, accommodation_id, event_id)
             VALUES (?1,?2,?3,?4,?5,?6)
             ON CONFLICT(id) DO UPDATE SET trip_id=excluded.trip_id, date=excluded.date,
                 title=excluded.title, accommodation_id=excluded.accommodation_id,
                 event_id=excluded.event_id",
            params![
                it.id,
                trip_id,
                it.date,
                it.title,
                it.accommodation_id,
                it.event_id
            ],
        )
        .with_context(|| format!("Import itinerary entry '{}'", it.id))?;
    }

    for a in &s.allocations {
        tx.execute(
            "INSERT INTO budget_allocations(trip_id, category, amount) VALUES (?1,?2,?3)
             ON CONFLICT(trip_id, category) DO UPDATE SET amount=excluded.amount",
            params![trip_id, a.category, a.amount.as_deref().unwrap_or("0")],
        )
        .with_context(|| format!("Import allocation '{}'", a.category))?;
    }

    tx.commit()?;
    tracing::info!(trip_id, "snapshot imported");
    Ok(())
}
