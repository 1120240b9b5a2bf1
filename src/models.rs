// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Accepts cost text spelled either as a JSON string or a JSON number and
/// keeps it as text; parsing into a number happens in the budget engine.
fn de_cost_text<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<serde_json::Value> = Option::deserialize(d)?;
    Ok(match v {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>, // YYYY-MM-DD
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    #[serde(default, deserialize_with = "de_cost_text")]
    pub cost_per_night: Option<String>,
    #[serde(default, deserialize_with = "de_cost_text")]
    pub total_cost: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub destination_id: String,
    pub name: String,
    pub status: String,
    #[serde(default, deserialize_with = "de_cost_text")]
    pub total_cost: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearch {
    pub id: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOptionRecord {
    pub id: String,
    pub flight_search_id: String,
    pub airline: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub status: String,
    #[serde(default, deserialize_with = "de_cost_text")]
    pub total_price: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualBudgetItem {
    pub id: String,
    pub category: String,
    pub description: String,
    #[serde(default, deserialize_with = "de_cost_text")]
    pub estimated_cost: Option<String>,
    #[serde(default, deserialize_with = "de_cost_text")]
    pub actual_cost: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryEntry {
    pub id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub accommodation_id: Option<String>,
    #[serde(default)]
    pub event_id: Option<String>,
}

/// Per-category spending ceiling set for a trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAllocation {
    pub category: String,
    #[serde(default, deserialize_with = "de_cost_text")]
    pub amount: Option<String>,
}

/// A whole trip with every record it owns, as read from or written to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSnapshot {
    pub trip: Trip,
    #[serde(default)]
    pub accommodations: Vec<AccommodationRecord>,
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub flight_searches: Vec<FlightSearch>,
    #[serde(default)]
    pub flight_options: Vec<FlightOptionRecord>,
    #[serde(default)]
    pub budget_items: Vec<ManualBudgetItem>,
    #[serde(default)]
    pub itinerary: Vec<ItineraryEntry>,
    #[serde(default)]
    pub allocations: Vec<CategoryAllocation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccommodationStatus {
    Researched,
    Shortlisted,
    Booked,
    Cancelled,
    Unknown,
}

impl AccommodationStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "researched" => Self::Researched,
            "shortlisted" => Self::Shortlisted,
            "booked" => Self::Booked,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    Researched,
    Interested,
    Booked,
    Attended,
    Unknown,
}

impl EventStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "researched" => Self::Researched,
            "interested" => Self::Interested,
            "booked" => Self::Booked,
            "attended" => Self::Attended,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStatus {
    Found,
    Shortlisted,
    Booked,
    Dismissed,
    Unknown,
}

impl FlightStatus {
    /// Statuses whose options are fetched for the budget.
    pub const BUDGETED: [FlightStatus; 2] = [FlightStatus::Shortlisted, FlightStatus::Booked];

    pub fn parse(s: &str) -> Self {
        match s {
            "found" => Self::Found,
            "shortlisted" => Self::Shortlisted,
            "booked" => Self::Booked,
            "dismissed" => Self::Dismissed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::Shortlisted => "shortlisted",
            Self::Booked => "booked",
            Self::Dismissed => "dismissed",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetSource {
    Accommodation,
    Event,
    Flight,
}

impl BudgetSource {
    /// The `byCategory` bucket computed items of this source land in.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Accommodation => "accommodations",
            Self::Event => "activities",
            Self::Flight => "flights",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accommodation => "accommodation",
            Self::Event => "event",
            Self::Flight => "flight",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummaryItem {
    pub id: String,
    pub name: String,
    pub source: BudgetSource,
    pub status: String,
    pub estimated_cost: Decimal,
    pub actual_cost: Decimal,
    pub category: String,
    pub currency: String,
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub on_itinerary: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTotals {
    pub items: Vec<BudgetSummaryItem>,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputedBudget {
    pub accommodations: SourceTotals,
    pub events: SourceTotals,
    pub flights: SourceTotals,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualTotals {
    pub items: Vec<ManualBudgetItem>,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrandTotal {
    pub estimated: Decimal,
    pub actual: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub computed: ComputedBudget,
    pub manual: ManualTotals,
    pub by_category: BTreeMap<String, Decimal>,
    pub grand_total: GrandTotal,
}

/// Allocation vs estimated spend for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatus {
    pub category: String,
    pub allocated: Decimal,
    pub estimated: Decimal,
    pub remaining: Decimal,
}
