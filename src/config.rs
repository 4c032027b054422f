//! Runtime configuration
//!
//! Defaults reproduce the pacing and cache constants the directory client has
//! always used; every field can be overridden through `COCKTAIL_*`
//! environment variables (e.g. `COCKTAIL_BATCH_DELAY_MS=500`).

use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Longest accepted cache lifespan (ten years).
const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed into its field
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),

    /// A value was parsed but is unusable
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Root of the TheCocktailDB API
    pub base_url: String,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
    /// Lookups per pacing batch in filter resolution
    pub batch_size: usize,
    /// Pause inserted between pacing batches
    pub batch_delay_ms: u64,
    /// Entry bound of each per-filter-kind response cache
    pub filter_cache_capacity: usize,
    /// Entry bound of the individual cocktail cache
    pub cocktail_cache_capacity: usize,
    /// Lifespan of in-memory response cache entries
    pub response_ttl_secs: u64,
    /// Lifespan of the persisted popular-cocktails snapshot
    pub popular_ttl_secs: u64,
    /// Retries on top of the first attempt for retried lookups
    pub retry_count: u32,
    pub retry_backoff_min_ms: u64,
    pub retry_backoff_max_ms: u64,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.thecocktaildb.com/api/json/v1/1".to_string(),
            request_timeout_secs: 10,
            batch_size: 5,
            batch_delay_ms: 200,
            filter_cache_capacity: 50,
            cocktail_cache_capacity: 200,
            response_ttl_secs: 30 * 60,
            popular_ttl_secs: 24 * 60 * 60,
            retry_count: 1,
            retry_backoff_min_ms: 100,
            retry_backoff_max_ms: 300,
        }
    }
}

impl FinderConfig {
    /// Loads the defaults overlaid with `COCKTAIL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_figment(Figment::from(Serialized::defaults(Self::default())).merge(
            Env::prefixed("COCKTAIL_"),
        ))
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make the client misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        };

        if self.base_url.trim().is_empty() {
            return Err(invalid("base_url", "must not be empty"));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be at least 1"));
        }
        if self.filter_cache_capacity == 0 {
            return Err(invalid("filter_cache_capacity", "must be at least 1"));
        }
        if self.cocktail_cache_capacity == 0 {
            return Err(invalid("cocktail_cache_capacity", "must be at least 1"));
        }
        if self.response_ttl_secs > MAX_TTL_SECS {
            return Err(invalid("response_ttl_secs", "must not exceed ten years"));
        }
        if self.popular_ttl_secs > MAX_TTL_SECS {
            return Err(invalid("popular_ttl_secs", "must not exceed ten years"));
        }
        if self.retry_backoff_min_ms > self.retry_backoff_max_ms {
            return Err(invalid(
                "retry_backoff_min_ms",
                "must not exceed retry_backoff_max_ms",
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn response_ttl(&self) -> Duration {
        Duration::from_secs(self.response_ttl_secs)
    }

    pub fn popular_ttl(&self) -> Duration {
        Duration::from_secs(self.popular_ttl_secs)
    }
}
