//! View state owned by the browser view.
//!
//! The store starts out `Loading` when the view is activated and is
//! settled exactly once, by the activation fetch, to either `Ready` or
//! `Failed`. Later writes are ignored. Dropping the store tears the view
//! down; a fetch finishing after that has nowhere to land.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::EventRecord;

/// Lifecycle of the one event collection a view holds.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// Fetch in flight
    Loading,
    /// Fetch succeeded; validated events in feed order
    Ready(Vec<EventRecord>),
    /// Fetch failed
    Failed(String),
}

impl ViewState {
    /// Short status name, as exposed by the JSON API.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }

    /// Whether the state can no longer change.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// Single-writer cell holding the view's [`ViewState`].
#[derive(Debug, Clone)]
pub struct EventStore {
    inner: Arc<RwLock<ViewState>>,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore {
    /// Create a store in the `Loading` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(ViewState::Loading)),
        }
    }

    /// Snapshot of the current state.
    pub async fn snapshot(&self) -> ViewState {
        self.inner.read().await.clone()
    }

    /// Settle the store with the fetch outcome.
    ///
    /// Returns `false` if the store was already settled, in which case
    /// the outcome is discarded.
    pub async fn settle<E: std::fmt::Display>(&self, outcome: Result<Vec<EventRecord>, E>) -> bool {
        let mut state = self.inner.write().await;
        if state.is_settled() {
            warn!("view state already settled, discarding fetch outcome");
            return false;
        }

        *state = match outcome {
            Ok(events) => {
                info!("loaded {} events", events.len());
                ViewState::Ready(events)
            }
            Err(e) => {
                warn!("feed fetch failed: {e:#}");
                ViewState::Failed(e.to_string())
            }
        };
        true
    }
}
