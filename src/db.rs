// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{
    AccommodationRecord, CategoryAllocation, Destination, EventRecord, FlightOptionRecord,
    FlightSearch, FlightStatus, ItineraryEntry, ManualBudgetItem,
};
use crate::store::{RecordStore, StoreResult};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, Row};
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Tripclip", "tripclip"));

pub const DB_ENV: &str = "TRIPCLIP_DB";

/// `--db` flag wins, then `TRIPCLIP_DB`, then the platform data dir.
pub fn resolve_db_path(flag: Option<&str>) -> Result<PathBuf> {
    if let Some(p) = flag.map(str::trim).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    db_path()
}

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("tripclip.sqlite"))
}

pub fn open_or_init(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS trips(
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        start_date TEXT,
        end_date TEXT,
        currency TEXT NOT NULL DEFAULT 'USD',
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS accommodations(
        id TEXT PRIMARY KEY,
        trip_id TEXT NOT NULL,
        name TEXT NOT NULL,
        status TEXT NOT NULL,
        cost_per_night TEXT,
        total_cost TEXT,
        currency TEXT NOT NULL,
        FOREIGN KEY(trip_id) REFERENCES trips(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_accommodations_trip ON accommodations(trip_id);

    CREATE TABLE IF NOT EXISTS destinations(
        id TEXT PRIMARY KEY,
        trip_id TEXT NOT NULL,
        name TEXT NOT NULL,
        FOREIGN KEY(trip_id) REFERENCES trips(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS events(
        id TEXT PRIMARY KEY,
        destination_id TEXT NOT NULL,
        name TEXT NOT NULL,
        status TEXT NOT NULL,
        total_cost TEXT,
        currency TEXT NOT NULL,
        FOREIGN KEY(destination_id) REFERENCES destinations(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_events_destination ON events(destination_id);

    CREATE TABLE IF NOT EXISTS flight_searches(
        id TEXT PRIMARY KEY,
        trip_id TEXT NOT NULL,
        origin TEXT,
        destination TEXT,
        FOREIGN KEY(trip_id) REFERENCES trips(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS flight_options(
        id TEXT PRIMARY KEY,
        flight_search_id TEXT NOT NULL,
        airline TEXT NOT NULL,
        departure_airport TEXT NOT NULL,
        arrival_airport TEXT NOT NULL,
        status TEXT NOT NULL,
        total_price TEXT,
        currency TEXT NOT NULL,
        FOREIGN KEY(flight_search_id) REFERENCES flight_searches(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_flight_options_search ON flight_options(flight_search_id);

    CREATE TABLE IF NOT EXISTS budget_items(
        id TEXT PRIMARY KEY,
        trip_id TEXT NOT NULL,
        category TEXT NOT NULL,
        description TEXT NOT NULL,
        estimated_cost TEXT,
        actual_cost TEXT,
        date TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(trip_id) REFERENCES trips(id) ON DELETE CASCADE
    );

    -- accommodation_id / event_id are soft references; doctor reports dangling ones
    CREATE TABLE IF NOT EXISTS itinerary_items(
        id TEXT PRIMARY KEY,
        trip_id TEXT NOT NULL,
        date TEXT,
        title TEXT,
        accommodation_id TEXT,
        event_id TEXT,
        CHECK(accommodation_id IS NULL OR event_id IS NULL),
        FOREIGN KEY(trip_id) REFERENCES trips(id) ON DELETE CASCADE
    );
    CREATE INDEX IF NOT EXISTS idx_itinerary_trip ON itinerary_items(trip_id);

    CREATE TABLE IF NOT EXISTS budget_allocations(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        trip_id TEXT NOT NULL,
        category TEXT NOT NULL,
        amount TEXT NOT NULL,
        UNIQUE(trip_id, category),
        FOREIGN KEY(trip_id) REFERENCES trips(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}

pub fn trip_exists(conn: &Connection, trip_id: &str) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM trips WHERE id=?1",
        params![trip_id],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(",")
}

/// Record store over a SQLite file. Every fetch opens its own read-only
/// connection, so fetches issued from different threads do not contend on
/// a shared handle.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_conn(&self) -> StoreResult<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    fn query_all<T, P, F>(&self, sql: &str, params: P, map: F) -> StoreResult<Vec<T>>
    where
        P: rusqlite::Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.read_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

impl RecordStore for SqliteStore {
    fn fetch_accommodations(&self, trip_id: &str) -> StoreResult<Vec<AccommodationRecord>> {
        self.query_all(
            "SELECT id, name, status, cost_per_night, total_cost, currency
             FROM accommodations WHERE trip_id=?1 ORDER BY rowid",
            params![trip_id],
            |r| {
                Ok(AccommodationRecord {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    status: r.get(2)?,
                    cost_per_night: r.get(3)?,
                    total_cost: r.get(4)?,
                    currency: r.get(5)?,
                })
            },
        )
    }

    fn fetch_destinations(&self, trip_id: &str) -> StoreResult<Vec<Destination>> {
        self.query_all(
            "SELECT id, name FROM destinations WHERE trip_id=?1 ORDER BY rowid",
            params![trip_id],
            |r| {
                Ok(Destination {
                    id: r.get(0)?,
                    name: r.get(1)?,
                })
            },
        )
    }

    fn fetch_manual_budget_items(&self, trip_id: &str) -> StoreResult<Vec<ManualBudgetItem>> {
        self.query_all(
            "SELECT id, category, description, estimated_cost, actual_cost, date
             FROM budget_items WHERE trip_id=?1 ORDER BY rowid",
            params![trip_id],
            |r| {
                Ok(ManualBudgetItem {
                    id: r.get(0)?,
                    category: r.get(1)?,
                    description: r.get(2)?,
                    estimated_cost: r.get(3)?,
                    actual_cost: r.get(4)?,
                    date: r.get(5)?,
                })
            },
        )
    }

    fn fetch_flight_searches(&self, trip_id: &str) -> StoreResult<Vec<FlightSearch>> {
        self.query_all(
            "SELECT id, origin, destination FROM flight_searches WHERE trip_id=?1 ORDER BY rowid",
            params![trip_id],
            |r| {
                Ok(FlightSearch {
                    id: r.get(0)?,
                    origin: r.get(1)?,
                    destination: r.get(2)?,
                })
            },
        )
    }

    fn fetch_itinerary_entries(&self, trip_id: &str) -> StoreResult<Vec<ItineraryEntry>> {
        self.query_all(
            "SELECT id, date, title, accommodation_id, event_id
             FROM itinerary_items WHERE trip_id=?1 ORDER BY date, rowid",
            params![trip_id],
            |r| {
                Ok(ItineraryEntry {
                    id: r.get(0)?,
                    date: r.get(1)?,
                    title: r.get(2)?,
                    accommodation_id: r.get(3)?,
                    event_id: r.get(4)?,
                })
            },
        )
    }

    fn fetch_events_by_destination_ids(&self, ids: &[String]) -> StoreResult<Vec<EventRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, destination_id, name, status, total_cost, currency
             FROM events WHERE destination_id IN ({}) ORDER BY rowid",
            placeholders(ids.len())
        );
        self.query_all(&sql, params_from_iter(ids.iter()), |r| {
            Ok(EventRecord {
                id: r.get(0)?,
                destination_id: r.get(1)?,
                name: r.get(2)?,
                status: r.get(3)?,
                total_cost: r.get(4)?,
                currency: r.get(5)?,
            })
        })
    }

    fn fetch_flight_options_by_status(
        &self,
        search_ids: &[String],
        statuses: &[FlightStatus],
    ) -> StoreResult<Vec<FlightOptionRecord>> {
        if search_ids.is_empty() || statuses.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, flight_search_id, airline, departure_airport, arrival_airport,
                    status, total_price, currency
             FROM flight_options
             WHERE flight_search_id IN ({}) AND status IN ({})
             ORDER BY rowid",
            placeholders(search_ids.len()),
            placeholders(statuses.len())
        );
        let bind: Vec<&str> = search_ids
            .iter()
            .map(String::as_str)
            .chain(statuses.iter().map(|s| s.as_str()))
            .collect();
        self.query_all(&sql, params_from_iter(bind), |r| {
            Ok(FlightOptionRecord {
                id: r.get(0)?,
                flight_search_id: r.get(1)?,
                airline: r.get(2)?,
                departure_airport: r.get(3)?,
                arrival_airport: r.get(4)?,
                status: r.get(5)?,
                total_price: r.get(6)?,
                currency: r.get(7)?,
            })
        })
    }

    fn fetch_category_allocations(&self, trip_id: &str) -> StoreResult<Vec<CategoryAllocation>> {
        self.query_all(
            "SELECT category, amount FROM budget_allocations WHERE trip_id=?1 ORDER BY category",
            params![trip_id],
            |r| {
                Ok(CategoryAllocation {
                    category: r.get(0)?,
                    amount: r.get(1)?,
                })
            },
        )
    }
}
