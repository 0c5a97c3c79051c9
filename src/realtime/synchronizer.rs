use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::order::{OrderNumber, OrderStatus};
use crate::domain::session::DiningMode;
use crate::domain::tracker::TrackerState;
use crate::realtime::{FeedSubscription, OrderChange, OrderFeed};

#[derive(Debug)]
struct SyncState {
    tracker: TrackerState,
    notifications: VecDeque<String>,
}

/// Keeps one session's tracker in step with the change feed.
///
/// Dropping the synchronizer releases its feed subscription.
#[derive(Debug)]
pub struct StatusSynchronizer {
    state: Arc<Mutex<SyncState>>,
    subscription: Option<FeedSubscription>,
}

impl StatusSynchronizer {
    /// Tracker for an order that never reached the store. No updates will
    /// arrive for it.
    pub fn local(order_number: OrderNumber, dining_mode: DiningMode) -> Self {
        let tracker = TrackerState::new(None, order_number, dining_mode, OrderStatus::Pending);
        Self {
            state: Arc::new(Mutex::new(SyncState {
                tracker,
                notifications: VecDeque::new(),
            })),
            subscription: None,
        }
    }

    /// Follow updates to `order_id` on `feed`, starting from `status`.
    pub fn subscribe(
        feed: &OrderFeed,
        order_id: i32,
        order_number: OrderNumber,
        dining_mode: DiningMode,
        status: OrderStatus,
    ) -> Self {
        let tracker = TrackerState::new(Some(order_id), order_number, dining_mode, status);
        let state = Arc::new(Mutex::new(SyncState {
            tracker,
            notifications: VecDeque::new(),
        }));

        let listener_state = Arc::clone(&state);
        let subscription = feed.subscribe(move |change| {
            let OrderChange::Updated(order) = change else {
                return;
            };
            if order.id != order_id {
                return;
            }

            let mut state = listener_state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(message) = state.tracker.apply(order.status) {
                log::info!(
                    "Order #{} moved to {}",
                    order.order_number.value(),
                    <&'static str>::from(order.status)
                );
                state.notifications.push_back(message.to_string());
            }
        });

        Self {
            state,
            subscription: Some(subscription),
        }
    }

    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn snapshot(&self) -> TrackerState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tracker
            .clone()
    }

    /// Drain status messages queued since the last call.
    pub fn take_notifications(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .notifications
            .drain(..)
            .collect()
    }
}
