use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;

use scout_dedup::config::Config;
use scout_dedup::domain::CandidateEvent;
use scout_dedup::flight_cache::{FlightDeduplicationCache, RedisCacheStore};
use scout_dedup::logging::init_logging;
use scout_dedup::persistence::EventPersister;
use scout_dedup::storage::InMemoryEventStore;
use scout_dedup::Deduplicator;

#[derive(Parser)]
#[command(name = "scout-dedup")]
#[command(about = "Deduplication and identity-caching core for the travel scout pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deduplicate a scraped event batch from a JSON file
    Deduplicate {
        /// Path to a JSON array of candidate events
        #[arg(long)]
        input: PathBuf,
        /// Skip the fuzzy matching phase (exact hash collisions only)
        #[arg(long)]
        no_fuzzy: bool,
        /// Write the deduplicated batch as JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also run the batch through the persistence adapter (in-memory store)
        #[arg(long)]
        save: bool,
    },
    /// Show flight cache statistics
    CacheStats,
    /// Clear all flight cache entries
    ClearCache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging and metrics
    init_logging();
    scout_dedup::metrics::init_metrics();

    let config = Config::load_or_default();

    match cli.command {
        Commands::Deduplicate {
            input,
            no_fuzzy,
            output,
            save,
        } => {
            let events = read_candidate_events(&input)?;
            println!("🧹 Deduplicating {} candidate events from {}", events.len(), input.display());

            if save {
                let store = Arc::new(InMemoryEventStore::new());
                let persister = EventPersister::with_deduplicator(
                    store.clone(),
                    Deduplicator::with_threshold(config.dedup.fuzzy_threshold),
                );
                let report = persister.save_events(events, true).await?;
                println!(
                    "✅ Saved {} events ({} inserted, {} updated, {} skipped, {} failed, {} duplicates removed)",
                    report.saved_count(),
                    report.inserted,
                    report.updated,
                    report.skipped,
                    report.failed,
                    report.duplicates_removed
                );
            } else {
                let use_fuzzy = !no_fuzzy && config.dedup.use_fuzzy_matching;
                let deduplicator = Deduplicator::with_threshold(config.dedup.fuzzy_threshold);
                let outcome = deduplicator.deduplicate(events, use_fuzzy);

                println!(
                    "✅ {} unique events ({} duplicates removed)",
                    outcome.events.len(),
                    outcome.duplicates_removed
                );

                if let Some(output_path) = output {
                    let json = serde_json::to_string_pretty(&outcome.events)?;
                    std::fs::write(&output_path, json)?;
                    println!("📄 Wrote deduplicated batch to {}", output_path.display());
                }
            }
        }
        Commands::CacheStats => {
            let cache = connect_flight_cache(&config).await?;
            let stats = cache.get_cache_stats().await;
            println!(
                "📊 Flight cache: {} keys under prefix '{}' (TTL {}s)",
                stats.total_keys, stats.key_prefix, stats.ttl_secs
            );
        }
        Commands::ClearCache => {
            let cache = connect_flight_cache(&config).await?;
            let deleted = cache.clear_cache().await;
            println!("🗑️  Cleared {} flight cache entries", deleted);
        }
    }

    Ok(())
}

/// Parses a JSON array of candidate events, skipping unparseable records so
/// one malformed scrape never loses the batch.
fn read_candidate_events(path: &PathBuf) -> anyhow::Result<Vec<CandidateEvent>> {
    let raw = std::fs::read_to_string(path)?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw)?;

    let mut events = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<CandidateEvent>(value) {
            Ok(event) => events.push(event),
            Err(e) => warn!("Skipping unparseable candidate event: {}", e),
        }
    }

    Ok(events)
}

async fn connect_flight_cache(config: &Config) -> anyhow::Result<FlightDeduplicationCache> {
    let store = RedisCacheStore::connect(&config.flight_cache.redis_url).await?;
    Ok(FlightDeduplicationCache::with_config(
        Arc::new(store),
        config.flight_cache.ttl_secs,
        config.flight_cache.key_prefix.clone(),
    ))
}
