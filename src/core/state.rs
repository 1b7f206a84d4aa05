//! Observable state for one feed

use crate::core::feed::Feed;
use crate::core::result::UiState;
use crate::core::sync::{FeedResult, Generation, Synchronizer};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Holds the latest [`UiState`] of a feed in a single slot.
///
/// Every [`refresh`](StateHolder::refresh) starts a new cycle and flips the
/// slot to `Loading` right away. Results of a cycle that has since been
/// superseded are dropped, so a slow response can never overwrite a
/// fresher one. Subscribers always see the most recent value, including
/// ones that attach after it was published.
pub struct StateHolder<F: Feed> {
    synchronizer: Arc<Synchronizer<F>>,
    generation: Generation,
    sender: Arc<watch::Sender<FeedResult<F>>>,
}

impl<F: Feed> StateHolder<F> {
    /// Creates the holder and starts the first cycle. Must be called from
    /// within a Tokio runtime.
    pub fn new(synchronizer: Synchronizer<F>) -> Self {
        let holder = Self::idle(synchronizer);
        holder.refresh();
        holder
    }

    /// Creates the holder without starting a cycle.
    pub fn idle(synchronizer: Synchronizer<F>) -> Self {
        let (sender, _) = watch::channel(UiState::Loading);
        Self {
            synchronizer: Arc::new(synchronizer),
            generation: Generation::new(),
            sender: Arc::new(sender),
        }
    }

    /// Starts a new cycle regardless of the current state.
    pub fn refresh(&self) -> JoinHandle<()> {
        let cycle = self.generation.start();
        self.sender.send_replace(UiState::Loading);

        let synchronizer = Arc::clone(&self.synchronizer);
        let sender = Arc::clone(&self.sender);
        tokio::spawn(async move {
            let state = synchronizer.sync(&cycle).await;
            sender.send_if_modified(|current| {
                if cycle.is_current() {
                    *current = state;
                    true
                } else {
                    debug!(
                        feed = F::TABLE,
                        cycle = cycle.id(),
                        "Discarding result of superseded cycle"
                    );
                    false
                }
            });
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedResult<F>> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> FeedResult<F> {
        self.sender.borrow().clone()
    }

    /// Starts a new cycle and waits for the slot to settle.
    pub async fn reload(&self) -> FeedResult<F> {
        self.refresh();
        self.settled().await
    }

    /// Waits until the slot holds a terminal state and returns it.
    pub async fn settled(&self) -> FeedResult<F> {
        let mut receiver = self.sender.subscribe();
        let settled = match receiver.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.current(),
        };
        settled
    }
}
