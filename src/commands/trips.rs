// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Trip;
use crate::utils::{maybe_print_json, new_id, parse_date, pretty_table};
use anyhow::{Result, bail};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    if name.is_empty() {
        bail!("Trip name cannot be empty");
    }
    let start = sub
        .get_one::<String>("start")
        .map(|s| parse_date(s.trim()))
        .transpose()?;
    let end = sub
        .get_one::<String>("end")
        .map(|s| parse_date(s.trim()))
        .transpose()?;
    if let (Some(s), Some(e)) = (start, end) {
        if e < s {
            bail!("Trip ends ({}) before it starts ({})", e, s);
        }
    }
    let currency = sub
        .get_one::<String>("currency")
        .unwrap()
        .trim()
        .to_uppercase();
    let id = new_id();
    conn.execute(
        "INSERT INTO trips(id, name, start_date, end_date, currency) VALUES (?1,?2,?3,?4,?5)",
        params![
            id,
            name,
            start.map(|d| d.to_string()),
            end.map(|d| d.to_string()),
            currency
        ],
    )?;
    tracing::info!(trip_id = %id, "trip created");
    println!("Added trip '{}' ({})", name, id);
    Ok(())
}

pub fn list_trips(conn: &Connection) -> Result<Vec<Trip>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, start_date, end_date, currency FROM trips
         ORDER BY start_date IS NULL, start_date, name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(Trip {
            id: r.get(0)?,
            name: r.get(1)?,
            start_date: r.get(2)?,
            end_date: r.get(3)?,
            currency: r.get(4)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let trips = list_trips(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &trips)? {
        return Ok(());
    }
    let data = trips
        .into_iter()
        .map(|t| {
            vec![
                t.id,
                t.name,
                t.start_date.unwrap_or_default(),
                t.end_date.unwrap_or_default(),
                t.currency,
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Name", "Start", "End", "CCY"], data)
    );
    Ok(())
}
