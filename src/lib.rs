pub mod config;
pub mod dedup;
pub mod domain;
pub mod error;
pub mod flight_cache;
pub mod logging;
pub mod metrics;
pub mod observability;
pub mod persistence;
pub mod storage;

pub use config::Config;
pub use dedup::{deduplicate_events, generate_deduplication_hash, Deduplicator};
pub use domain::{CandidateEvent, CandidateFlight, MergedEvent, StoredEvent};
pub use flight_cache::{flight_identity_hash, FlightDeduplicationCache};
pub use persistence::{EventPersister, SaveReport};
