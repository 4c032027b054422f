//! Cocktail Finder - search, filter and favorite cocktail recipes
//!
//! This library wraps the TheCocktailDB recipe directory with in-memory
//! response caches, paced batch lookups that turn filter results into full
//! recipes, cooperative cancellation, and persistence for favorites and the
//! popular-cocktails list.
//!
//! Everything is wired explicitly: build a [`CocktailFinder`] once at start-up
//! and hand out references to it.

mod cache;
mod config;
mod directory;
mod favorites;
mod orchestrator;
mod popular;
mod retry;
mod selection;
mod store;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use cache::{CacheEntry, ResponseCache};
pub use config::{ConfigError, FinderConfig};
pub use directory::{
    Cocktail, CocktailDirectory, CocktailSummary, DirectoryError, FilterCategory, FilterKind,
    Ingredient, TheCocktailDb,
};
pub use favorites::FavoritesStore;
pub use orchestrator::{FetchError, FetchEvent, FetchOrchestrator};
pub use popular::PopularCocktailsCache;
pub use retry::RetryPolicy;
pub use selection::{FilterSelection, SelectionState};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

/// Cocktails shown on the start screen until the user searches.
pub const POPULAR_COCKTAIL_IDS: [&str; 8] = [
    "11000", "11001", "11002", "11003", "11004", "11005", "11006", "11007",
];

/// Top-level error type for Cocktail Finder set-up and operations
#[derive(Debug, Error)]
pub enum CocktailFinderError {
    /// Error while loading configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error while building the directory client
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Error while opening persistent storage
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Error during an orchestrated fetch
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// The assembled client: orchestrator, filter selection and persistence.
pub struct CocktailFinder<D = TheCocktailDb> {
    orchestrator: Arc<FetchOrchestrator<D>>,
    selection: Arc<FilterSelection<D>>,
    favorites: FavoritesStore,
    popular: PopularCocktailsCache,
}

impl CocktailFinder<TheCocktailDb> {
    /// Builds a client for the live API with on-disk persistence.
    ///
    /// Favorites go to the durable data directory. The popular snapshot can be
    /// refetched at any time and lives in the cache directory.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cocktail_finder::{CocktailFinder, FinderConfig, FilterKind};
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # async fn run() -> Result<(), cocktail_finder::CocktailFinderError> {
    /// let finder = CocktailFinder::open(&FinderConfig::from_env()?)?;
    /// let token = CancellationToken::new();
    ///
    /// let gin = finder
    ///     .orchestrator()
    ///     .fetch_by_filter(FilterKind::Ingredient, "Gin", &token, |event| {
    ///         println!("{event:?}");
    ///     })
    ///     .await?;
    /// println!("{} gin cocktails", gin.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(config: &FinderConfig) -> Result<Self, CocktailFinderError> {
        config.validate()?;
        let directory = TheCocktailDb::new(config.base_url.clone(), config.request_timeout())?;
        let favorites = FileStore::open_data("favorites")?;
        let popular = FileStore::open("popular")?;
        info!(
            base_url = %config.base_url,
            favorites = %favorites.dir().display(),
            popular = %popular.dir().display(),
            "cocktail finder ready"
        );
        Ok(Self::new(
            directory,
            Arc::new(favorites),
            Arc::new(popular),
            config,
        ))
    }
}

impl<D> CocktailFinder<D>
where
    D: CocktailDirectory + 'static,
{
    /// Wires the given directory and key/value stores together.
    ///
    /// `favorites_store` holds user data and must be durable; `popular_store`
    /// only holds the regenerable popular-cocktails snapshot.
    pub fn new(
        directory: D,
        favorites_store: Arc<dyn KeyValueStore>,
        popular_store: Arc<dyn KeyValueStore>,
        config: &FinderConfig,
    ) -> Self {
        let orchestrator = Arc::new(FetchOrchestrator::new(directory, config));
        Self {
            selection: Arc::new(FilterSelection::new(Arc::clone(&orchestrator))),
            orchestrator,
            favorites: FavoritesStore::new(favorites_store),
            popular: PopularCocktailsCache::new(popular_store, config.popular_ttl()),
        }
    }

    pub fn orchestrator(&self) -> &Arc<FetchOrchestrator<D>> {
        &self.orchestrator
    }

    pub fn selection(&self) -> &Arc<FilterSelection<D>> {
        &self.selection
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn popular(&self) -> &PopularCocktailsCache {
        &self.popular
    }

    /// Returns the popular cocktails, from the durable cache when it is still
    /// valid, otherwise by looking up [`POPULAR_COCKTAIL_IDS`] one by one.
    ///
    /// Cocktails that fail to load are skipped. A freshly loaded list is
    /// written back to the durable cache.
    pub async fn load_popular_cocktails(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<Cocktail>, FetchError> {
        if let Some(cached) = self.popular.get() {
            debug!(count = cached.len(), "popular cocktails served from cache");
            return Ok(self.mark_favorites(cached));
        }

        let mut loaded = Vec::with_capacity(POPULAR_COCKTAIL_IDS.len());
        for id in POPULAR_COCKTAIL_IDS {
            match self.orchestrator.fetch_by_id(id, token).await {
                Ok(cocktail) => loaded.push(cocktail),
                Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
                Err(e) => warn!(id, error = %e, "skipping popular cocktail"),
            }
        }

        self.popular.put(&loaded);
        Ok(self.mark_favorites(loaded))
    }

    /// Sets each record's favorite flag from the favorites store.
    pub fn mark_favorites(&self, cocktails: Vec<Cocktail>) -> Vec<Cocktail> {
        let favorites = self.favorites.all();
        cocktails
            .into_iter()
            .map(|cocktail| {
                let favorite = favorites.iter().any(|f| f.id == cocktail.id);
                cocktail.with_favorite(favorite)
            })
            .collect()
    }

    /// Adds or removes `cocktail` from the favorites and returns the new flag.
    pub fn toggle_favorite(&self, cocktail: &Cocktail) -> bool {
        if self.favorites.is_favorite(&cocktail.id) {
            self.favorites.remove(cocktail);
            false
        } else {
            self.favorites.add(cocktail);
            true
        }
    }
}
