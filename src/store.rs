// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read contracts the budget engine depends on.
//!
//! A store answers "all records of this kind for this trip (or these ids)";
//! it never filters or reshapes beyond that. Implementations must be `Sync`
//! because independent fetches run on separate threads.

use crate::models::{
    AccommodationRecord, CategoryAllocation, Destination, EventRecord, FlightOptionRecord,
    FlightSearch, FlightStatus, ItineraryEntry, ManualBudgetItem, TripSnapshot,
};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("trip '{0}' not found")]
    TripNotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait RecordStore: Sync {
    fn fetch_accommodations(&self, trip_id: &str) -> StoreResult<Vec<AccommodationRecord>>;

    /// Only the ids matter to the engine; they scope the events fetch.
    fn fetch_destinations(&self, trip_id: &str) -> StoreResult<Vec<Destination>>;

    fn fetch_manual_budget_items(&self, trip_id: &str) -> StoreResult<Vec<ManualBudgetItem>>;

    /// Only the ids matter to the engine; they scope the flight options fetch.
    fn fetch_flight_searches(&self, trip_id: &str) -> StoreResult<Vec<FlightSearch>>;

    fn fetch_itinerary_entries(&self, trip_id: &str) -> StoreResult<Vec<ItineraryEntry>>;

    fn fetch_events_by_destination_ids(&self, ids: &[String]) -> StoreResult<Vec<EventRecord>>;

    fn fetch_flight_options_by_status(
        &self,
        search_ids: &[String],
        statuses: &[FlightStatus],
    ) -> StoreResult<Vec<FlightOptionRecord>>;

    fn fetch_category_allocations(&self, trip_id: &str) -> StoreResult<Vec<CategoryAllocation>>;
}

/// Store backed by in-memory trip snapshots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    trips: Vec<TripSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trip(mut self, snapshot: TripSnapshot) -> Self {
        self.insert(snapshot);
        self
    }

    /// Adds a trip, replacing any snapshot with the same trip id.
    pub fn insert(&mut self, snapshot: TripSnapshot) {
        self.trips.retain(|t| t.trip.id != snapshot.trip.id);
        self.trips.push(snapshot);
    }

    pub fn from_json_file(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: TripSnapshot = serde_json::from_str(&raw)?;
        Ok(Self::new().with_trip(snapshot))
    }

    fn trip(&self, trip_id: &str) -> StoreResult<&TripSnapshot> {
        self.trips
            .iter()
            .find(|t| t.trip.id == trip_id)
            .ok_or_else(|| StoreError::TripNotFound(trip_id.to_string()))
    }
}

impl RecordStore for MemoryStore {
    fn fetch_accommodations(&self, trip_id: &str) -> StoreResult<Vec<AccommodationRecord>> {
        Ok(self.trip(trip_id)?.accommodations.clone())
    }

    fn fetch_destinations(&self, trip_id: &str) -> StoreResult<Vec<Destination>> {
        Ok(self.trip(trip_id)?.destinations.clone())
    }

    fn fetch_manual_budget_items(&self, trip_id: &str) -> StoreResult<Vec<ManualBudgetItem>> {
        Ok(self.trip(trip_id)?.budget_items.clone())
    }

    fn fetch_flight_searches(&self, trip_id: &str) -> StoreResult<Vec<FlightSearch>> {
        Ok(self.trip(trip_id)?.flight_searches.clone())
    }

    fn fetch_itinerary_entries(&self, trip_id: &str) -> StoreResult<Vec<ItineraryEntry>> {
        Ok(self.trip(trip_id)?.itinerary.clone())
    }

    fn fetch_events_by_destination_ids(&self, ids: &[String]) -> StoreResult<Vec<EventRecord>> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        Ok(self
            .trips
            .iter()
            .flat_map(|t| t.events.iter())
            .filter(|e| wanted.contains(e.destination_id.as_str()))
            .cloned()
            .collect())
    }

    fn fetch_flight_options_by_status(
        &self,
        search_ids: &[String],
        statuses: &[FlightStatus],
    ) -> StoreResult<Vec<FlightOptionRecord>> {
        let wanted: HashSet<&str> = search_ids.iter().map(String::as_str).collect();
        Ok(self
            .trips
            .iter()
            .flat_map(|t| t.flight_options.iter())
            .filter(|f| wanted.contains(f.flight_search_id.as_str()))
            .filter(|f| statuses.contains(&FlightStatus::parse(&f.status)))
            .cloned()
            .collect())
    }

    fn fetch_category_allocations(&self, trip_id: &str) -> StoreResult<Vec<CategoryAllocation>> {
        Ok(self.trip(trip_id)?.allocations.clone())
    }
}
