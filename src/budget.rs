// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget reconciliation.
//!
//! Merges a trip's booking records (accommodations, events, flight options)
//! with its manual budget lines into one summary of estimated and actual
//! spend. Itinerary placement decides how accommodations and events count:
//! scheduled records are costed from the itinerary, unscheduled ones only
//! when they are committed enough to matter.

use crate::models::{
    AccommodationRecord, AccommodationStatus, BudgetSource, BudgetSummary, BudgetSummaryItem,
    CategoryAllocation, CategoryStatus, EventRecord, EventStatus, FlightOptionRecord,
    FlightStatus, GrandTotal, ItineraryEntry, ManualBudgetItem, ManualTotals, SourceTotals,
};
use crate::store::{RecordStore, StoreResult};
use crate::utils::parse_cost;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::thread;

/// Which accommodations and events are scheduled, and for how long.
#[derive(Debug, Clone, Default)]
pub struct ItineraryIndex {
    nights_by_accommodation: HashMap<String, u32>,
    days_by_event: HashMap<String, u32>,
}

impl ItineraryIndex {
    pub fn build(entries: &[ItineraryEntry]) -> Self {
        let mut idx = Self::default();
        for entry in entries {
            if let Some(id) = entry.accommodation_id.as_deref() {
                *idx.nights_by_accommodation.entry(id.to_string()).or_default() += 1;
            }
            if let Some(id) = entry.event_id.as_deref() {
                *idx.days_by_event.entry(id.to_string()).or_default() += 1;
            }
        }
        idx
    }

    pub fn has_accommodation(&self, id: &str) -> bool {
        self.nights_by_accommodation.contains_key(id)
    }

    pub fn has_event(&self, id: &str) -> bool {
        self.days_by_event.contains_key(id)
    }

    pub fn nights(&self, accommodation_id: &str) -> u32 {
        self.nights_by_accommodation
            .get(accommodation_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn days(&self, event_id: &str) -> u32 {
        self.days_by_event.get(event_id).copied().unwrap_or(0)
    }
}

/// How a record takes part in the budget. Rules are tried in order and the
/// first that matches decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Scheduled on the itinerary.
    Itinerary,
    /// Not scheduled, but committed enough to count.
    Committed,
    Excluded,
}

type Rule<T> = fn(&T, &ItineraryIndex) -> Option<Placement>;

fn scheduled_accommodation(a: &AccommodationRecord, idx: &ItineraryIndex) -> Option<Placement> {
    idx.has_accommodation(&a.id).then_some(Placement::Itinerary)
}

fn committed_accommodation(a: &AccommodationRecord, _: &ItineraryIndex) -> Option<Placement> {
    matches!(
        AccommodationStatus::parse(&a.status),
        AccommodationStatus::Booked | AccommodationStatus::Shortlisted
    )
    .then_some(Placement::Committed)
}

fn scheduled_event(e: &EventRecord, idx: &ItineraryIndex) -> Option<Placement> {
    idx.has_event(&e.id).then_some(Placement::Itinerary)
}

// zero-cost interest carries no budget signal
fn committed_event(e: &EventRecord, _: &ItineraryIndex) -> Option<Placement> {
    let committed = matches!(
        EventStatus::parse(&e.status),
        EventStatus::Booked | EventStatus::Interested
    );
    (committed && parse_cost(e.total_cost.as_deref()) > Decimal::ZERO)
        .then_some(Placement::Committed)
}

const ACCOMMODATION_RULES: [Rule<AccommodationRecord>; 2] =
    [scheduled_accommodation, committed_accommodation];

const EVENT_RULES: [Rule<EventRecord>; 2] = [scheduled_event, committed_event];

fn classify<T>(record: &T, idx: &ItineraryIndex, rules: &[Rule<T>]) -> Placement {
    rules
        .iter()
        .find_map(|rule| rule(record, idx))
        .unwrap_or(Placement::Excluded)
}

pub fn classify_accommodation(a: &AccommodationRecord, idx: &ItineraryIndex) -> Placement {
    classify(a, idx, &ACCOMMODATION_RULES)
}

pub fn classify_event(e: &EventRecord, idx: &ItineraryIndex) -> Placement {
    classify(e, idx, &EVENT_RULES)
}

fn item_id(source: BudgetSource, source_id: &str) -> String {
    format!("{}-{}", source.as_str(), source_id)
}

// Amounts saturate at `Decimal::MAX` instead of overflowing.
fn sum<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, d| acc.saturating_add(d))
}

fn totals(items: Vec<BudgetSummaryItem>) -> SourceTotals {
    let total = sum(items.iter().map(|i| i.estimated_cost));
    SourceTotals { items, total }
}

pub fn reconcile_accommodations(
    records: &[AccommodationRecord],
    idx: &ItineraryIndex,
) -> SourceTotals {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut items = Vec::new();
    for a in records {
        if !seen.insert(a.id.as_str()) {
            continue;
        }
        let placement = classify_accommodation(a, idx);
        let total = parse_cost(a.total_cost.as_deref());
        let (estimated, detail) = match placement {
            Placement::Excluded => continue,
            Placement::Committed => (total, None),
            Placement::Itinerary => {
                let nights = idx.nights(&a.id);
                let rate = parse_cost(a.cost_per_night.as_deref());
                let has_rate = a
                    .cost_per_night
                    .as_deref()
                    .is_some_and(|s| !s.trim().is_empty());
                if has_rate && nights > 0 {
                    let plural = if nights == 1 { "night" } else { "nights" };
                    (
                        rate.saturating_mul(Decimal::from(nights)),
                        Some(format!(
                            "{} {} × {:.2} {}/night",
                            nights, plural, rate, a.currency
                        )),
                    )
                } else {
                    (total, None)
                }
            }
        };
        let booked = AccommodationStatus::parse(&a.status) == AccommodationStatus::Booked;
        items.push(BudgetSummaryItem {
            id: item_id(BudgetSource::Accommodation, &a.id),
            name: a.name.clone(),
            source: BudgetSource::Accommodation,
            status: a.status.clone(),
            estimated_cost: estimated,
            actual_cost: if booked { estimated } else { Decimal::ZERO },
            category: BudgetSource::Accommodation.category().to_string(),
            currency: a.currency.clone(),
            source_id: a.id.clone(),
            detail,
            on_itinerary: placement == Placement::Itinerary,
        });
    }
    totals(items)
}

pub fn reconcile_events(records: &[EventRecord], idx: &ItineraryIndex) -> SourceTotals {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut items = Vec::new();
    for e in records {
        if !seen.insert(e.id.as_str()) {
            continue;
        }
        let placement = classify_event(e, idx);
        if placement == Placement::Excluded {
            continue;
        }
        // a multi-day event's total already covers every day it spans
        let total = parse_cost(e.total_cost.as_deref());
        let days = idx.days(&e.id);
        let detail = (placement == Placement::Itinerary && days > 1)
            .then(|| format!("{}-day event (total, not per day)", days));
        // attended alone does not count as actual spend
        let booked = EventStatus::parse(&e.status) == EventStatus::Booked;
        items.push(BudgetSummaryItem {
            id: item_id(BudgetSource::Event, &e.id),
            name: e.name.clone(),
            source: BudgetSource::Event,
            status: e.status.clone(),
            estimated_cost: total,
            actual_cost: if booked { total } else { Decimal::ZERO },
            category: BudgetSource::Event.category().to_string(),
            currency: e.currency.clone(),
            source_id: e.id.clone(),
            detail,
            on_itinerary: placement == Placement::Itinerary,
        });
    }
    totals(items)
}

/// Flights are not gated by the itinerary; the status filter is applied
/// when the options are fetched.
pub fn include_flights(records: &[FlightOptionRecord]) -> SourceTotals {
    let items = records
        .iter()
        .map(|f| {
            let price = parse_cost(f.total_price.as_deref());
            let booked = FlightStatus::parse(&f.status) == FlightStatus::Booked;
            BudgetSummaryItem {
                id: item_id(BudgetSource::Flight, &f.id),
                name: format!(
                    "{} {} → {}",
                    f.airline, f.departure_airport, f.arrival_airport
                ),
                source: BudgetSource::Flight,
                status: f.status.clone(),
                estimated_cost: price,
                actual_cost: if booked { price } else { Decimal::ZERO },
                category: BudgetSource::Flight.category().to_string(),
                currency: f.currency.clone(),
                source_id: f.id.clone(),
                detail: None,
                on_itinerary: false,
            }
        })
        .collect();
    totals(items)
}

/// Estimated cost of a manual line, falling back to the actual cost when
/// no estimate was entered.
pub fn manual_item_cost(item: &ManualBudgetItem) -> Decimal {
    let estimate = item
        .estimated_cost
        .as_deref()
        .filter(|s| !s.trim().is_empty());
    match estimate {
        Some(s) => parse_cost(Some(s)),
        None => parse_cost(item.actual_cost.as_deref()),
    }
}

pub fn summarize_manual(items: Vec<ManualBudgetItem>) -> ManualTotals {
    let total = sum(items.iter().map(manual_item_cost));
    ManualTotals { items, total }
}

/// Everything the engine reads for one trip.
#[derive(Debug, Clone, Default)]
pub struct TripRecords {
    pub accommodations: Vec<AccommodationRecord>,
    pub events: Vec<EventRecord>,
    pub flight_options: Vec<FlightOptionRecord>,
    pub manual_items: Vec<ManualBudgetItem>,
    pub itinerary: Vec<ItineraryEntry>,
}

pub fn summarize(records: TripRecords) -> BudgetSummary {
    let idx = ItineraryIndex::build(&records.itinerary);

    let mut summary = BudgetSummary::default();
    summary.computed.accommodations = reconcile_accommodations(&records.accommodations, &idx);
    summary.computed.events = reconcile_events(&records.events, &idx);
    summary.computed.flights = include_flights(&records.flight_options);
    summary.manual = summarize_manual(records.manual_items);

    let computed = [
        &summary.computed.accommodations,
        &summary.computed.events,
        &summary.computed.flights,
    ];
    let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut grand = GrandTotal::default();
    for source in computed {
        for item in &source.items {
            let cat = by_category.entry(item.category.clone()).or_default();
            *cat = cat.saturating_add(item.estimated_cost);
            grand.actual = grand.actual.saturating_add(item.actual_cost);
        }
        grand.estimated = grand.estimated.saturating_add(source.total);
    }
    for item in &summary.manual.items {
        let cat = by_category.entry(item.category.clone()).or_default();
        *cat = cat.saturating_add(manual_item_cost(item));
        grand.actual = grand
            .actual
            .saturating_add(parse_cost(item.actual_cost.as_deref()));
    }
    grand.estimated = grand.estimated.saturating_add(summary.manual.total);

    summary.by_category = by_category;
    summary.grand_total = grand;
    summary
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}

/// Fetches the trip's records from `store` and reconciles them.
///
/// The five base collections are fetched concurrently; events and flight
/// options depend on destination and search ids and are fetched together
/// once those are known. Any failed fetch fails the whole call.
pub fn get_budget_summary<S>(store: &S, trip_id: &str) -> StoreResult<BudgetSummary>
where
    S: RecordStore + ?Sized,
{
    let _span = tracing::debug_span!("budget_summary", trip_id).entered();

    let (accommodations, destinations, manual_items, searches, itinerary) = thread::scope(|s| {
        let accommodations = s.spawn(|| store.fetch_accommodations(trip_id));
        let destinations = s.spawn(|| store.fetch_destinations(trip_id));
        let manual = s.spawn(|| store.fetch_manual_budget_items(trip_id));
        let searches = s.spawn(|| store.fetch_flight_searches(trip_id));
        let itinerary = s.spawn(|| store.fetch_itinerary_entries(trip_id));
        StoreResult::Ok((
            join(accommodations)?,
            join(destinations)?,
            join(manual)?,
            join(searches)?,
            join(itinerary)?,
        ))
    })?;

    let destination_ids: Vec<String> = destinations.into_iter().map(|d| d.id).collect();
    let search_ids: Vec<String> = searches.into_iter().map(|s| s.id).collect();

    let (events, flight_options) = thread::scope(|s| {
        let events = s.spawn(|| {
            if destination_ids.is_empty() {
                return Ok(Vec::new());
            }
            store.fetch_events_by_destination_ids(&destination_ids)
        });
        let flights = s.spawn(|| {
            if search_ids.is_empty() {
                return Ok(Vec::new());
            }
            store.fetch_flight_options_by_status(&search_ids, &FlightStatus::BUDGETED)
        });
        StoreResult::Ok((join(events)?, join(flights)?))
    })?;

    tracing::debug!(
        accommodations = accommodations.len(),
        events = events.len(),
        flights = flight_options.len(),
        manual = manual_items.len(),
        itinerary = itinerary.len(),
        "fetched trip records"
    );

    let summary = summarize(TripRecords {
        accommodations,
        events,
        flight_options,
        manual_items,
        itinerary,
    });
    tracing::info!(
        estimated = %summary.grand_total.estimated,
        actual = %summary.grand_total.actual,
        "budget reconciled"
    );
    Ok(summary)
}

/// Compares per-category allocations with the summary's estimated spend.
/// Every category present on either side gets a row.
pub fn category_status(
    summary: &BudgetSummary,
    allocations: &[CategoryAllocation],
) -> Vec<CategoryStatus> {
    let mut allocated: BTreeMap<&str, Decimal> = BTreeMap::new();
    for a in allocations {
        let slot = allocated.entry(a.category.as_str()).or_default();
        *slot = slot.saturating_add(parse_cost(a.amount.as_deref()));
    }
    let mut names: Vec<&str> = allocated.keys().copied().collect();
    names.extend(summary.by_category.keys().map(String::as_str));
    names.sort_unstable();
    names.dedup();

    names
        .into_iter()
        .map(|name| {
            let allocated = allocated.get(name).copied().unwrap_or(Decimal::ZERO);
            let estimated = summary
                .by_category
                .get(name)
                .copied()
                .unwrap_or(Decimal::ZERO);
            CategoryStatus {
                category: name.to_string(),
                allocated,
                estimated,
                remaining: allocated.saturating_sub(estimated),
            }
        })
        .collect()
}
