// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod trips;
pub mod budget;
pub mod importer;
pub mod exporter;
pub mod doctor;

use anyhow::{Result, bail};
use rusqlite::Connection;

pub(crate) fn require_trip(conn: &Connection, trip_id: &str) -> Result<()> {
    if !crate::db::trip_exists(conn, trip_id)? {
        bail!("Trip '{}' not found", trip_id);
    }
    Ok(())
}
