//! Retrying single-cocktail lookups with randomized backoff.

use crate::config::FinderConfig;
use crate::directory::{Cocktail, CocktailDirectory};
use crate::orchestrator::{FetchError, FetchOrchestrator, pause};
use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// How often and how patiently a lookup is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub retries: u32,
    pub backoff_min: Duration,
    pub backoff_max: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FinderConfig) -> Self {
        Self {
            retries: config.retry_count,
            backoff_min: Duration::from_millis(config.retry_backoff_min_ms),
            backoff_max: Duration::from_millis(config.retry_backoff_max_ms),
        }
    }

    /// Picks a uniformly random delay inside the backoff window.
    fn backoff(&self) -> Duration {
        let min = self.backoff_min.as_millis() as u64;
        let max = (self.backoff_max.as_millis() as u64).max(min);
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

impl<D> FetchOrchestrator<D>
where
    D: CocktailDirectory,
{
    /// [`fetch_by_id`](Self::fetch_by_id) with up to `retries` further
    /// attempts, each preceded by a random backoff.
    ///
    /// Cancellation ends the loop immediately, including during a backoff.
    pub async fn fetch_by_id_with_retry(
        &self,
        id: &str,
        token: &CancellationToken,
    ) -> Result<Cocktail, FetchError> {
        let policy = self.retry;
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                pause(token, policy.backoff()).await?;
            }

            match self.fetch_by_id(id, token).await {
                Ok(cocktail) => return Ok(cocktail),
                Err(FetchError::Cancelled) => return Err(FetchError::Cancelled),
                Err(e) if attempt >= policy.retries => return Err(e),
                Err(e) => {
                    attempt += 1;
                    warn!(id, attempt, retries = policy.retries, error = %e, "retrying cocktail lookup");
                }
            }
        }
    }
}
