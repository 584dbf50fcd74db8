//! State update delivery
//!
//! The protocol client pushes [`StateUpdate`]s; anything that wants to react
//! registers an observer with a [`StateUpdateSource`] and keeps the returned
//! [`Subscription`] alive for as long as it wants to hear about updates.
//! [`StateUpdateHub`] is the in-process source: it fans updates out to its
//! observers synchronously and can drain an async stream or broadcast
//! channel into them.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

use crate::protocol::StateUpdate;

/// Receiver of state updates
pub trait StateUpdateObserver: Send + Sync {
    fn on_state_update(&self, update: &StateUpdate);
}

impl<F> StateUpdateObserver for F
where
    F: Fn(&StateUpdate) + Send + Sync,
{
    fn on_state_update(&self, update: &StateUpdate) {
        self(update)
    }
}

/// Something observers can be registered with
pub trait StateUpdateSource {
    /// Register an observer. It stays registered until the returned
    /// subscription is dropped.
    fn add_observer(&self, observer: Arc<dyn StateUpdateObserver>) -> Subscription;
}

type ObserverTable = RwLock<BTreeMap<u64, Arc<dyn StateUpdateObserver>>>;

/// Registration handle, removes its observer when dropped
#[must_use = "the observer is removed as soon as the subscription is dropped"]
pub struct Subscription {
    id: u64,
    observers: Weak<ObserverTable>,
}

impl Subscription {
    /// Whether the source this subscription belongs to still exists
    pub fn is_active(&self) -> bool {
        self.observers
            .upgrade()
            .is_some_and(|table| table.read().contains_key(&self.id))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(table) = self.observers.upgrade() {
            table.write().remove(&self.id);
            tracing::debug!("Removed state update observer {}", self.id);
        }
    }
}

/// In-process fan-out of state updates to registered observers
#[derive(Default)]
pub struct StateUpdateHub {
    observers: Arc<ObserverTable>,
    next_id: AtomicU64,
}

impl StateUpdateHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    /// Deliver an update to every observer, in registration order.
    ///
    /// The observer table is not locked while observers run, so an observer
    /// may add or drop subscriptions from inside its callback.
    pub fn fire(&self, update: &StateUpdate) {
        let observers: Vec<_> = self.observers.read().values().cloned().collect();
        for observer in observers {
            observer.on_state_update(update);
        }
    }

    /// Deliver every update from `stream` until it ends, returning how many
    /// were delivered.
    pub async fn pump<S>(&self, mut stream: S) -> usize
    where
        S: Stream<Item = StateUpdate> + Unpin,
    {
        let mut delivered = 0;
        while let Some(update) = stream.next().await {
            self.fire(&update);
            delivered += 1;
        }
        delivered
    }

    /// Forward a broadcast channel into the hub on a background task.
    ///
    /// Lagged receivers skip the updates they missed. The task finishes once
    /// every sender is gone and resolves to the number of delivered updates.
    pub fn spawn_pump(
        self: &Arc<Self>,
        receiver: broadcast::Receiver<StateUpdate>,
    ) -> JoinHandle<usize> {
        let hub = Arc::clone(self);
        tokio::spawn(async move {
            let stream = BroadcastStream::new(receiver).filter_map(|item| match item {
                Ok(update) => Some(update),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!("State update feed lagged, skipped {} update(s)", skipped);
                    None
                }
            });
            hub.pump(Box::pin(stream)).await
        })
    }
}

impl StateUpdateSource for StateUpdateHub {
    fn add_observer(&self, observer: Arc<dyn StateUpdateObserver>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers.write().insert(id, observer);
        tracing::debug!("Registered state update observer {}", id);

        Subscription {
            id,
            observers: Arc::downgrade(&self.observers),
        }
    }
}

impl std::fmt::Debug for StateUpdateHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateUpdateHub")
            .field("observers", &self.observer_count())
            .finish()
    }
}
