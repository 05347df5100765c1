use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder used by scrapers when no concrete price information exists
pub const PRICE_RANGE_VARIES: &str = "varies";

/// A scraped event candidate as handed over by a scraper collaborator.
///
/// Candidates carry no uniqueness guarantee; the dedup pipeline decides
/// which of them describe the same real-world event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEvent {
    pub title: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub destination_city: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price_range: Option<String>,
    pub category: String,
    pub source: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A deduplicated event: the representative candidate plus the identity
/// hash and the provenance collected from its duplicate group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedEvent {
    pub event: CandidateEvent,
    /// Identity hash of the representative (64 hex chars, stable across runs)
    pub deduplication_hash: String,
    /// Distinct source identifiers in first-seen order
    pub sources: Vec<String>,
    /// Distinct non-empty urls in first-seen order
    pub urls: Vec<String>,
    /// How many raw candidates collapsed into this record (>= 1)
    pub duplicate_count: usize,
}

/// An event row as persisted by the Event Store.
///
/// The store indexes `deduplication_hash` so the persistence adapter can
/// reconcile incoming batches without scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: Option<Uuid>,
    pub title: String,
    pub event_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub destination_city: String,
    pub venue: Option<String>,
    pub description: Option<String>,
    pub price_range: Option<String>,
    pub category: String,
    pub source: String,
    pub url: Option<String>,
    pub deduplication_hash: String,
    pub scraped_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A scraped flight offer candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateFlight {
    pub origin_airport: String,
    pub destination_airport: String,
    pub departure_date: NaiveDate,
    #[serde(default)]
    pub departure_time: Option<NaiveTime>,
    #[serde(default)]
    pub airline: Option<String>,
    #[serde(default)]
    pub price_per_person: Option<f64>,
    #[serde(default)]
    pub total_price: Option<f64>,
}

/// Outcome of reconciling one deduplicated event against the Event Store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Created,
    Updated,
    Skipped,
}

impl StoredEvent {
    /// Builds a fresh store row from a deduplicated record.
    pub fn from_merged(merged: &MergedEvent, now: DateTime<Utc>) -> Self {
        let event = &merged.event;
        Self {
            id: None,
            title: event.title.clone(),
            event_date: event.event_date,
            end_date: event.end_date,
            destination_city: event.destination_city.clone(),
            venue: event.venue.clone(),
            description: event.description.clone(),
            price_range: Some(
                event
                    .price_range
                    .clone()
                    .unwrap_or_else(|| PRICE_RANGE_VARIES.to_string()),
            ),
            category: event.category.clone(),
            source: event.source.clone(),
            url: event.url.clone(),
            deduplication_hash: merged.deduplication_hash.clone(),
            scraped_at: now,
            created_at: now,
        }
    }
}
