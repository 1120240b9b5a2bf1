// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

/// Tolerant cost parse shared by every record-derived amount: absent, blank
/// or unparseable text counts as zero.
pub fn parse_cost(s: Option<&str>) -> Decimal {
    let Some(raw) = s.map(str::trim).filter(|s| !s.is_empty()) else {
        return Decimal::ZERO;
    };
    raw.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(raw))
        .unwrap_or(Decimal::ZERO)
}

/// True when the text is present but would be read as zero by `parse_cost`.
pub fn is_malformed_cost(s: Option<&str>) -> bool {
    match s.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw.parse::<Decimal>().is_err() && Decimal::from_scientific(raw).is_err(),
        None => false,
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Strict parse for amounts typed on the command line.
pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Logs go to stderr so `--json` output on stdout stays machine readable.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cost_tolerates_garbage() {
        assert_eq!(parse_cost(Some("45.50")), Decimal::new(455, 1));
        assert_eq!(parse_cost(Some(" 320.00 ")), Decimal::from(320));
        assert_eq!(parse_cost(Some("abc")), Decimal::ZERO);
        assert_eq!(parse_cost(Some("")), Decimal::ZERO);
        assert_eq!(parse_cost(None), Decimal::ZERO);
        assert_eq!(parse_cost(Some("1e3")), Decimal::from(1000));
    }

    #[test]
    fn malformed_cost_only_flags_present_text() {
        assert!(is_malformed_cost(Some("12,50")));
        assert!(!is_malformed_cost(Some("12.50")));
        assert!(!is_malformed_cost(Some("  ")));
        assert!(!is_malformed_cost(None));
    }
}
