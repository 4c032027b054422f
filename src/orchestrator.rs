//! Fetch orchestration
//!
//! The [`FetchOrchestrator`] sits between callers and a [`CocktailDirectory`].
//! It owns the response caches, paces the per-cocktail lookups that turn a
//! filter result into full recipes, and honours a [`CancellationToken`] at
//! every suspension point.

use crate::cache::ResponseCache;
use crate::config::FinderConfig;
use crate::directory::{Cocktail, CocktailDirectory, DirectoryError, FilterCategory, FilterKind};
use crate::retry::RetryPolicy;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors surfaced by orchestrated fetches.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The operation was cancelled through its token
    #[error("Operation was cancelled")]
    Cancelled,

    /// The directory request failed
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl FetchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// Progress event emitted while a filter selection is being resolved
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    /// The summary list arrived and `total` lookups are about to start
    Started {
        kind: FilterKind,
        value: String,
        total: usize,
    },

    /// A pacing batch is about to start; `loaded` lookups are done
    Progress {
        loaded: usize,
        total: usize,
        message: String,
    },

    /// All lookups finished and the result was cached
    Complete {
        kind: FilterKind,
        value: String,
        count: usize,
    },
}

/// Cache-backed, paced access to a cocktail directory.
pub struct FetchOrchestrator<D> {
    directory: D,
    /// One cache per filter kind, indexed by [`FilterKind::index`]
    filter_caches: [ResponseCache; 4],
    cocktail_cache: ResponseCache,
    batch_size: usize,
    batch_delay: Duration,
    pub(crate) retry: RetryPolicy,
}

impl<D> FetchOrchestrator<D>
where
    D: CocktailDirectory,
{
    /// Creates an orchestrator over `directory` with caches and pacing taken
    /// from `config`.
    pub fn new(directory: D, config: &FinderConfig) -> Self {
        let ttl = config.response_ttl();
        let filter_cache = || ResponseCache::new(config.filter_cache_capacity, ttl);

        Self {
            directory,
            filter_caches: [filter_cache(), filter_cache(), filter_cache(), filter_cache()],
            cocktail_cache: ResponseCache::new(config.cocktail_cache_capacity, ttl),
            batch_size: config.batch_size.max(1),
            batch_delay: config.batch_delay(),
            retry: RetryPolicy::from_config(config),
        }
    }

    /// The wrapped directory.
    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn filter_cache(&self, kind: FilterKind) -> &ResponseCache {
        &self.filter_caches[kind.index()]
    }

    pub fn cocktail_cache(&self) -> &ResponseCache {
        &self.cocktail_cache
    }

    /// Resolves a single cocktail, serving it from the cocktail cache when
    /// possible.
    ///
    /// A failed lookup is returned as-is and never retried here; see
    /// [`fetch_by_id_with_retry`](Self::fetch_by_id_with_retry).
    pub async fn fetch_by_id(
        &self,
        id: &str,
        token: &CancellationToken,
    ) -> Result<Cocktail, FetchError> {
        ensure_live(token)?;

        let cache_key = cocktail_cache_key(id);
        if let Some(entry) = self.cocktail_cache.get(&cache_key)
            && let Some(cocktail) = entry.cocktails().first()
        {
            debug!(id, "cocktail served from cache");
            return Ok(cocktail.clone());
        }

        let cocktail = guarded(token, self.directory.lookup_by_id(id)).await?;
        ensure_live(token)?;

        self.cocktail_cache.put(cache_key, vec![cocktail.clone()]);
        Ok(cocktail)
    }

    /// Resolves a filter selection into full cocktail records.
    ///
    /// Records keep the order of the directory's summary list. Lookups run one
    /// at a time; before every batch of `batch_size` lookups a progress event
    /// is emitted, and from the second batch on a fixed delay is awaited
    /// first. Individual lookup failures are logged and the cocktail is
    /// left out. On cancellation nothing is cached and no completion event is
    /// emitted.
    pub async fn fetch_by_filter<F>(
        &self,
        kind: FilterKind,
        value: &str,
        token: &CancellationToken,
        mut on_event: F,
    ) -> Result<Vec<Cocktail>, FetchError>
    where
        F: FnMut(FetchEvent) + Send,
    {
        ensure_live(token)?;

        let cache = self.filter_cache(kind);
        if let Some(entry) = cache.get(value) {
            debug!(%kind, value, count = entry.cocktails().len(), "filter served from cache");
            return Ok(entry.cocktails().to_vec());
        }

        debug!(%kind, value, "fetching filter summaries");
        let summaries = guarded(token, self.directory.filter(kind, value)).await?;
        ensure_live(token)?;

        let total = summaries.len();
        on_event(FetchEvent::Started {
            kind,
            value: value.to_string(),
            total,
        });

        let mut cocktails = Vec::with_capacity(total);
        for (index, summary) in summaries.iter().enumerate() {
            if index % self.batch_size == 0 {
                ensure_live(token)?;
                if index > 0 {
                    pause(token, self.batch_delay).await?;
                }
                on_event(FetchEvent::Progress {
                    loaded: index,
                    total,
                    message: format!("{index} of {total} loaded"),
                });
            }

            match self.fetch_by_id(&summary.id, token).await {
                Ok(cocktail) => cocktails.push(cocktail),
                Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
                Err(e) => {
                    warn!(
                        id = %summary.id,
                        name = %summary.name,
                        error = %e,
                        "dropping cocktail that failed to load"
                    );
                }
            }
        }

        ensure_live(token)?;

        cache.put(value, cocktails.clone());
        info!(%kind, value, count = cocktails.len(), total, "filter resolved");
        on_event(FetchEvent::Complete {
            kind,
            value: value.to_string(),
            count: cocktails.len(),
        });

        Ok(cocktails)
    }

    /// Builds the complete filter menu from four concurrent list queries.
    ///
    /// Any failing query fails the whole menu.
    pub async fn fetch_filter_options(
        &self,
        token: &CancellationToken,
    ) -> Result<Vec<FilterCategory>, FetchError> {
        let directory = &self.directory;
        let (categories, glasses, ingredients, alcoholic) = guarded(token, async {
            tokio::try_join!(
                directory.list_options(FilterKind::Category),
                directory.list_options(FilterKind::Glass),
                directory.list_options(FilterKind::Ingredient),
                directory.list_options(FilterKind::Alcoholic),
            )
        })
        .await?;

        let menu = FilterKind::ALL
            .into_iter()
            .zip([categories, glasses, ingredients, alcoholic])
            .map(|(kind, options)| FilterCategory {
                kind,
                name: kind.display_name().to_string(),
                options,
            })
            .collect::<Vec<_>>();

        debug!(
            sections = menu.len(),
            options = menu.iter().map(|c| c.options.len()).sum::<usize>(),
            "filter options loaded"
        );
        Ok(menu)
    }

    /// Searches cocktails by name. A blank query yields no results without
    /// touching the directory.
    pub async fn search_by_name(
        &self,
        name: &str,
        token: &CancellationToken,
    ) -> Result<Vec<Cocktail>, FetchError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }
        guarded(token, self.directory.search_by_name(name)).await
    }

    /// Lists all cocktails starting with `letter`.
    pub async fn search_by_first_letter(
        &self,
        letter: char,
        token: &CancellationToken,
    ) -> Result<Vec<Cocktail>, FetchError> {
        guarded(token, self.directory.search_by_first_letter(letter)).await
    }

    pub async fn fetch_random(&self, token: &CancellationToken) -> Result<Cocktail, FetchError> {
        guarded(token, self.directory.random()).await
    }
}

fn cocktail_cache_key(id: &str) -> String {
    format!("cocktail_{id}")
}

pub(crate) fn ensure_live(token: &CancellationToken) -> Result<(), FetchError> {
    if token.is_cancelled() {
        Err(FetchError::Cancelled)
    } else {
        Ok(())
    }
}

/// Runs a directory request, abandoning it as soon as `token` is cancelled.
async fn guarded<T, F>(token: &CancellationToken, request: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, DirectoryError>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(FetchError::Cancelled),
        result = request => result.map_err(FetchError::from),
    }
}

/// Sleeps for `delay` unless `token` is cancelled first.
pub(crate) async fn pause(token: &CancellationToken, delay: Duration) -> Result<(), FetchError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(FetchError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
