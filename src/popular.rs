//! Durable popular-cocktails snapshot
//!
//! Stores the list shown on the start screen together with an expiry
//! timestamp (seconds since the Unix epoch) under two keys.

use crate::directory::Cocktail;
use crate::store::KeyValueStore;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub(crate) const POPULAR_KEY: &str = "popularCocktailsCache";
pub(crate) const POPULAR_EXPIRATION_KEY: &str = "popularCocktailsCacheExpiration";

/// Persisted popular-cocktails list with a fixed lifespan.
pub struct PopularCocktailsCache {
    store: Arc<dyn KeyValueStore>,
    lifespan: TimeDelta,
}

impl PopularCocktailsCache {
    /// Creates a cache whose snapshots live for `lifespan`.
    pub fn new(store: Arc<dyn KeyValueStore>, lifespan: Duration) -> Self {
        Self {
            store,
            lifespan: TimeDelta::from_std(lifespan).unwrap_or(TimeDelta::days(1)),
        }
    }

    /// Replaces the snapshot and stamps a fresh expiry.
    pub fn put(&self, cocktails: &[Cocktail]) {
        let snapshot = match serde_json::to_string(cocktails) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "failed to encode popular cocktails");
                return;
            }
        };

        let Some(expires_at) = Utc::now().checked_add_signed(self.lifespan) else {
            warn!(lifespan = %self.lifespan, "popular cocktails expiry out of range, not saving");
            return;
        };
        let expiry = format!("{}", expires_at.timestamp_millis() as f64 / 1000.0);

        let result = self
            .store
            .set(POPULAR_KEY, &snapshot)
            .and_then(|()| self.store.set(POPULAR_EXPIRATION_KEY, &expiry));
        if let Err(e) = result {
            warn!(error = %e, "failed to save popular cocktails");
        }
    }

    /// Returns the snapshot if present and unexpired.
    ///
    /// An expired snapshot is removed from storage as a side effect.
    pub fn get(&self) -> Option<Vec<Cocktail>> {
        let expires_at = self.expires_at()?;
        if Utc::now() > expires_at {
            self.clear();
            return None;
        }

        let snapshot = self.store.get(POPULAR_KEY).ok().flatten()?;
        serde_json::from_str(&snapshot)
            .inspect_err(|e| warn!(error = %e, "failed to decode popular cocktails"))
            .ok()
    }

    /// Whether an unexpired snapshot is stored.
    pub fn is_valid(&self) -> bool {
        let Some(expires_at) = self.expires_at() else {
            return false;
        };
        Utc::now() <= expires_at && matches!(self.store.get(POPULAR_KEY), Ok(Some(_)))
    }

    pub fn clear(&self) {
        for key in [POPULAR_KEY, POPULAR_EXPIRATION_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "failed to clear popular cocktails");
            }
        }
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.store.get(POPULAR_EXPIRATION_KEY).ok().flatten()?;
        let seconds: f64 = raw.trim().parse().ok()?;
        DateTime::from_timestamp_millis((seconds * 1000.0) as i64)
    }
}
