use crate::error::{DedupError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default similarity threshold for fuzzy title matching
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;
/// Default TTL for flight cache entries, in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
/// Default key prefix for flight cache entries
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "flight:";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub dedup: DedupSettings,
    #[serde(default)]
    pub flight_cache: FlightCacheSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DedupSettings {
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    #[serde(default = "default_use_fuzzy")]
    pub use_fuzzy_matching: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlightCacheSettings {
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            use_fuzzy_matching: true,
        }
    }
}

impl Default for FlightCacheSettings {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            key_prefix: DEFAULT_CACHE_KEY_PREFIX.to_string(),
        }
    }
}

fn default_fuzzy_threshold() -> f64 {
    DEFAULT_FUZZY_THRESHOLD
}

fn default_use_fuzzy() -> bool {
    true
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_key_prefix() -> String {
    DEFAULT_CACHE_KEY_PREFIX.to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_content = fs::read_to_string(path).map_err(|e| {
            DedupError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Loads config.toml if present, otherwise falls back to defaults.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("Using default configuration: {}", e);
                Config::default()
            }
        }
    }
}
