//! The user's current filter selection.
//!
//! At most one filter resolution is live at a time. Selecting a new filter
//! cancels the previous resolution, and a resolution only publishes state
//! while it is still the current one, so a slow superseded request can never
//! overwrite the newer selection. State is published as immutable snapshots
//! over a [`watch`] channel.

use crate::directory::{Cocktail, CocktailDirectory, FilterKind};
use crate::orchestrator::{FetchError, FetchEvent, FetchOrchestrator};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Snapshot of the selection as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionState {
    /// Nothing selected
    Idle,

    /// Resolution in flight; `progress` carries the latest progress message
    Loading {
        kind: FilterKind,
        value: String,
        progress: Option<String>,
    },

    /// Resolution finished with at least one cocktail
    Loaded {
        kind: FilterKind,
        value: String,
        cocktails: Arc<Vec<Cocktail>>,
    },

    /// Resolution finished without any cocktail
    Empty { kind: FilterKind, value: String },

    /// Resolution failed; the selection can be retried
    Failed {
        kind: FilterKind,
        value: String,
        message: String,
    },
}

/// Which selection is current, and how to cancel it while it runs.
#[derive(Default)]
struct Slot {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Drives filter resolutions for one UI-facing selection.
pub struct FilterSelection<D> {
    orchestrator: Arc<FetchOrchestrator<D>>,
    slot: Mutex<Slot>,
    state: watch::Sender<SelectionState>,
}

impl<D> FilterSelection<D>
where
    D: CocktailDirectory + 'static,
{
    pub fn new(orchestrator: Arc<FetchOrchestrator<D>>) -> Self {
        let (state, _) = watch::channel(SelectionState::Idle);
        Self {
            orchestrator,
            slot: Mutex::new(Slot::default()),
            state,
        }
    }

    /// Subscribes to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.state.subscribe()
    }

    /// The latest published snapshot.
    pub fn current(&self) -> SelectionState {
        self.state.borrow().clone()
    }

    /// Starts resolving `(kind, value)`, cancelling whatever was in flight.
    ///
    /// The returned handle finishes once the resolution has published its
    /// final state or observed its cancellation.
    pub fn select(self: &Arc<Self>, kind: FilterKind, value: impl Into<String>) -> JoinHandle<()> {
        let value = value.into();
        let token = CancellationToken::new();
        let generation = self.replace_active(Some(token.clone()));

        self.publish(
            generation,
            SelectionState::Loading {
                kind,
                value: value.clone(),
                progress: None,
            },
        );

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let progress_sink = Arc::clone(&this);
            let progress_value = value.clone();
            let result = this
                .orchestrator
                .fetch_by_filter(kind, &value, &token, move |event| {
                    if let FetchEvent::Progress { message, .. } = event {
                        progress_sink.publish(
                            generation,
                            SelectionState::Loading {
                                kind,
                                value: progress_value.clone(),
                                progress: Some(message),
                            },
                        );
                    }
                })
                .await;

            let state = match result {
                Ok(cocktails) if cocktails.is_empty() => SelectionState::Empty { kind, value },
                Ok(cocktails) => SelectionState::Loaded {
                    kind,
                    value,
                    cocktails: Arc::new(cocktails),
                },
                Err(FetchError::Cancelled) => {
                    debug!(%kind, value = %value, "superseded filter resolution cancelled");
                    return;
                }
                Err(e) => {
                    warn!(%kind, value = %value, error = %e, "filter resolution failed");
                    SelectionState::Failed {
                        kind,
                        value,
                        message: e.to_string(),
                    }
                }
            };

            if this.publish(generation, state) {
                this.finish(generation);
            }
        })
    }

    /// Cancels any in-flight resolution and returns to [`SelectionState::Idle`].
    pub fn clear(&self) {
        let generation = self.replace_active(None);
        self.publish(generation, SelectionState::Idle);
    }

    /// Installs a new current selection, cancelling the previous one, and
    /// returns its generation.
    fn replace_active(&self, token: Option<CancellationToken>) -> u64 {
        let mut slot = self.lock_slot();
        if let Some(previous) = slot.token.take() {
            previous.cancel();
        }
        slot.generation += 1;
        slot.token = token;
        slot.generation
    }

    /// Publishes `state` if `generation` is still the current selection.
    fn publish(&self, generation: u64, state: SelectionState) -> bool {
        let slot = self.lock_slot();
        if slot.generation != generation {
            return false;
        }
        self.state.send_replace(state);
        true
    }

    /// Releases the cancellation handle once a resolution has settled.
    fn finish(&self, generation: u64) {
        let mut slot = self.lock_slot();
        if slot.generation == generation {
            slot.token = None;
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}
