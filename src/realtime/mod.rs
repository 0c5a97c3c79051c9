//! In-process order change feed.
//!
//! Writers publish [`OrderChange`] events after a successful store write and
//! every live [`FeedSubscription`] receives them synchronously. Dropping the
//! subscription handle detaches the listener.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::domain::order::Order;

pub mod synchronizer;

/// Row level change on the orders table.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderChange {
    Inserted(Order),
    Updated(Order),
    Deleted { id: i32 },
}

impl OrderChange {
    pub fn order_id(&self) -> i32 {
        match self {
            OrderChange::Inserted(order) | OrderChange::Updated(order) => order.id,
            OrderChange::Deleted { id } => *id,
        }
    }
}

type Listener = Arc<dyn Fn(&OrderChange) + Send + Sync>;

struct FeedInner {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<u64, Listener>>,
}

/// Cloneable handle to the shared change feed.
#[derive(Clone)]
pub struct OrderFeed {
    inner: Arc<FeedInner>,
}

impl Default for OrderFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderFeed {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FeedInner {
                next_id: AtomicU64::new(1),
                listeners: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Register `listener` until the returned handle is dropped.
    pub fn subscribe<F>(&self, listener: F) -> FeedSubscription
    where
        F: Fn(&OrderChange) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(listener));

        FeedSubscription {
            id,
            feed: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `change` to every current subscriber.
    pub fn publish(&self, change: &OrderChange) {
        // Listeners run outside the lock so they may subscribe or drop handles.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        log::debug!(
            "Publishing change for order {} to {} subscriber(s)",
            change.order_id(),
            listeners.len()
        );

        for listener in listeners {
            listener(change);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// RAII handle for one feed listener.
pub struct FeedSubscription {
    id: u64,
    feed: Weak<FeedInner>,
}

impl FeedSubscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        if let Some(feed) = self.feed.upgrade() {
            feed.listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
        }
    }
}

impl std::fmt::Debug for FeedSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSubscription")
            .field("id", &self.id)
            .finish()
    }
}
