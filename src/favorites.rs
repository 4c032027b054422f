//! Favorite cocktails persistence
//!
//! The whole favorites collection is stored as one JSON snapshot under the
//! `favoriteCocktails` key and rewritten on every change.

use crate::directory::Cocktail;
use crate::store::KeyValueStore;
use std::sync::{Arc, Mutex};
use tracing::warn;

pub(crate) const FAVORITES_KEY: &str = "favoriteCocktails";

/// The user's favorite cocktails, at most one record per identifier.
///
/// Storage and serialization failures are logged and swallowed: an unreadable
/// snapshot reads as an empty collection.
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Adds `cocktail` unless a favorite with the same id already exists.
    pub fn add(&self, cocktail: &Cocktail) {
        let _guard = self.write_lock.lock();
        let mut favorites = self.all();
        if favorites.iter().any(|f| f.id == cocktail.id) {
            return;
        }
        favorites.push(cocktail.clone().with_favorite(true));
        self.save(&favorites);
    }

    /// Removes the favorite with `cocktail`'s id, if any.
    pub fn remove(&self, cocktail: &Cocktail) {
        let _guard = self.write_lock.lock();
        let mut favorites = self.all();
        let before = favorites.len();
        favorites.retain(|f| f.id != cocktail.id);
        if favorites.len() != before {
            self.save(&favorites);
        }
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.all().iter().any(|f| f.id == id)
    }

    /// All favorites in the order they were added.
    pub fn all(&self) -> Vec<Cocktail> {
        let snapshot = match self.store.get(FAVORITES_KEY) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read favorites");
                return Vec::new();
            }
        };

        serde_json::from_str(&snapshot).unwrap_or_else(|e| {
            warn!(error = %e, "failed to decode favorites, treating as empty");
            Vec::new()
        })
    }

    fn save(&self, favorites: &[Cocktail]) {
        let snapshot = match serde_json::to_string(favorites) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "failed to encode favorites");
                return;
            }
        };
        if let Err(e) = self.store.set(FAVORITES_KEY, &snapshot) {
            warn!(error = %e, "failed to save favorites");
        }
    }
}
