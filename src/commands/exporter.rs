// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::budget::{get_budget_summary, manual_item_cost};
use crate::commands::require_trip;
use crate::store::RecordStore;
use crate::utils::parse_cost;
use anyhow::{Result, bail};
use rusqlite::Connection;

pub fn handle(conn: &Connection, store: &dyn RecordStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("budget", sub)) => export_budget(conn, store, sub),
        _ => Ok(()),
    }
}

fn export_budget(conn: &Connection, store: &dyn RecordStore, sub: &clap::ArgMatches) -> Result<()> {
    let trip_id = sub.get_one::<String>("trip").unwrap().trim();
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }
    require_trip(conn, trip_id)?;
    let summary = get_budget_summary(store, trip_id)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "source",
                "source_id",
                "name",
                "category",
                "status",
                "estimated",
                "actual",
                "currency",
                "on_itinerary",
                "detail",
            ])?;
            let computed = [
                &summary.computed.accommodations,
                &summary.computed.events,
                &summary.computed.flights,
            ];
            for item in computed.into_iter().flat_map(|s| s.items.iter()) {
                wtr.write_record([
                    item.source.as_str().to_string(),
                    item.source_id.clone(),
                    item.name.clone(),
                    item.category.clone(),
                    item.status.clone(),
                    item.estimated_cost.to_string(),
                    item.actual_cost.to_string(),
                    item.currency.clone(),
                    item.on_itinerary.to_string(),
                    item.detail.clone().unwrap_or_default(),
                ])?;
            }
            for item in &summary.manual.items {
                wtr.write_record([
                    "manual".to_string(),
                    item.id.clone(),
                    item.description.clone(),
                    item.category.clone(),
                    String::new(),
                    manual_item_cost(item).to_string(),
                    parse_cost(item.actual_cost.as_deref()).to_string(),
                    String::new(),
                    "false".to_string(),
                    item.date.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&summary)?)?;
        }
    }
    println!("Exported budget for trip {} to {}", trip_id, out);
    Ok(())
}
