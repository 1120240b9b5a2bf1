// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::{category_status, get_budget_summary, manual_item_cost};
use crate::commands::require_trip;
use crate::models::BudgetSummary;
use crate::store::{MemoryStore, RecordStore};
use crate::utils::{
    fmt_money, maybe_print_json, new_id, parse_cost, parse_date, parse_decimal, pretty_table,
};
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};
use std::path::Path;

pub fn handle(conn: &Connection, store: &dyn RecordStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(conn, store, sub)?,
        Some(("add", sub)) => add(conn, sub)?,
        Some(("allocate", sub)) => allocate(conn, sub)?,
        Some(("categories", sub)) => categories(conn, store, sub)?,
        _ => {}
    }
    Ok(())
}

fn fmt_amount(d: &rust_decimal::Decimal) -> String {
    format!("{:.2}", d)
}

/// Matches of `budget summary --snapshot`, which reads nothing but the
/// snapshot file and so needs no database.
pub fn snapshot_request(m: &clap::ArgMatches) -> Option<&clap::ArgMatches> {
    let Some(("budget", budget)) = m.subcommand() else {
        return None;
    };
    match budget.subcommand() {
        Some(("summary", sub)) if sub.get_one::<String>("snapshot").is_some() => Some(sub),
        _ => None,
    }
}

pub fn snapshot_summary(sub: &clap::ArgMatches) -> Result<()> {
    let trip_id = sub.get_one::<String>("trip").unwrap().trim();
    let path = sub.get_one::<String>("snapshot").unwrap().trim();
    let snap = MemoryStore::from_json_file(Path::new(path))
        .with_context(|| format!("Load snapshot {}", path))?;
    let summary = get_budget_summary(&snap, trip_id)?;
    render_summary(sub, &summary)
}

fn summary(conn: &Connection, store: &dyn RecordStore, sub: &clap::ArgMatches) -> Result<()> {
    if sub.get_one::<String>("snapshot").is_some() {
        return snapshot_summary(sub);
    }
    let trip_id = sub.get_one::<String>("trip").unwrap().trim();
    require_trip(conn, trip_id)?;
    let summary = get_budget_summary(store, trip_id)?;
    render_summary(sub, &summary)
}

fn render_summary(sub: &clap::ArgMatches, summary: &BudgetSummary) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), summary)? {
        return Ok(());
    }
    print_summary(summary);
    Ok(())
}

fn print_summary(summary: &BudgetSummary) {
    let computed = [
        &summary.computed.accommodations,
        &summary.computed.events,
        &summary.computed.flights,
    ];
    let mut rows = Vec::new();
    for source in computed {
        for item in &source.items {
            rows.push(vec![
                item.source.as_str().to_string(),
                item.name.clone(),
                item.status.clone(),
                fmt_amount(&item.estimated_cost),
                fmt_amount(&item.actual_cost),
                item.currency.clone(),
                (if item.on_itinerary { "yes" } else { "" }).to_string(),
                item.detail.clone().unwrap_or_default(),
            ]);
        }
    }
    for item in &summary.manual.items {
        rows.push(vec![
            "manual".to_string(),
            item.description.clone(),
            item.category.clone(),
            fmt_amount(&manual_item_cost(item)),
            fmt_amount(&parse_cost(item.actual_cost.as_deref())),
            String::new(),
            String::new(),
            item.date.clone().unwrap_or_default(),
        ]);
    }
    println!(
        "{}",
        pretty_table(
            &[
                "Source",
                "Name",
                "Status",
                "Estimated",
                "Actual",
                "CCY",
                "Itinerary",
                "Detail"
            ],
            rows
        )
    );

    let cats = summary
        .by_category
        .iter()
        .map(|(c, v)| vec![c.clone(), fmt_amount(v)])
        .collect();
    println!("{}", pretty_table(&["Category", "Estimated"], cats));
    println!(
        "Estimated total: {}  Actual total: {}",
        fmt_amount(&summary.grand_total.estimated),
        fmt_amount(&summary.grand_total.actual)
    );
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let trip_id = sub.get_one::<String>("trip").unwrap().trim();
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let description = sub
        .get_one::<String>("description")
        .unwrap()
        .trim()
        .to_string();
    if category.is_empty() {
        bail!("Category cannot be empty");
    }
    let estimated = sub
        .get_one::<String>("estimated")
        .map(|s| parse_decimal(s.trim()))
        .transpose()?;
    let actual = sub
        .get_one::<String>("actual")
        .map(|s| parse_decimal(s.trim()))
        .transpose()?;
    let date = sub
        .get_one::<String>("date")
        .map(|s| parse_date(s.trim()))
        .transpose()?;
    require_trip(conn, trip_id)?;

    let id = new_id();
    conn.execute(
        "INSERT INTO budget_items(id, trip_id, category, description, estimated_cost, actual_cost, date)
         VALUES (?1,?2,?3,?4,?5,?6,?7)",
        params![
            id,
            trip_id,
            category,
            description,
            estimated.map(|d| d.to_string()),
            actual.map(|d| d.to_string()),
            date.map(|d| d.to_string())
        ],
    )?;
    println!("Added budget item '{}' to {} ({})", description, category, id);
    Ok(())
}

fn allocate(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let trip_id = sub.get_one::<String>("trip").unwrap().trim();
    let category = sub.get_one::<String>("category").unwrap().trim();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap().trim())?;
    require_trip(conn, trip_id)?;
    conn.execute(
        "INSERT INTO budget_allocations(trip_id, category, amount) VALUES (?1,?2,?3)
         ON CONFLICT(trip_id, category) DO UPDATE SET amount=excluded.amount",
        params![trip_id, category, amount.to_string()],
    )?;
    let ccy: String = conn.query_row(
        "SELECT currency FROM trips WHERE id=?1",
        params![trip_id],
        |r| r.get(0),
    )?;
    println!("Allocation set for {} = {}", category, fmt_money(&amount, &ccy));
    Ok(())
}

fn categories(conn: &Connection, store: &dyn RecordStore, sub: &clap::ArgMatches) -> Result<()> {
    let trip_id = sub.get_one::<String>("trip").unwrap().trim();
    require_trip(conn, trip_id)?;
    let summary = get_budget_summary(store, trip_id)?;
    let allocations = store.fetch_category_allocations(trip_id)?;
    let rows = category_status(&summary, &allocations);
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        return Ok(());
    }
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.category.clone(),
                fmt_amount(&r.allocated),
                fmt_amount(&r.estimated),
                fmt_amount(&r.remaining),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Allocated", "Estimated", "Remaining"], data)
    );
    Ok(())
}
