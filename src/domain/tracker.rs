use serde::Serialize;

use crate::domain::order::{OrderNumber, OrderStatus};
use crate::domain::session::DiningMode;

/// One step of the post-submission progress indicator.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TrackerStep {
    pub key: OrderStatus,
    pub label: &'static str,
}

/// Steps shown for the dining mode. Deliveries have an extra leg.
pub fn steps_for(mode: DiningMode) -> Vec<TrackerStep> {
    let mut steps = vec![
        TrackerStep {
            key: OrderStatus::Pending,
            label: "Ordered",
        },
        TrackerStep {
            key: OrderStatus::Preparing,
            label: "Preparing",
        },
    ];

    if mode == DiningMode::Delivery {
        steps.push(TrackerStep {
            key: OrderStatus::OutForDelivery,
            label: "On the way",
        });
        steps.push(TrackerStep {
            key: OrderStatus::Completed,
            label: "Delivered",
        });
    } else {
        steps.push(TrackerStep {
            key: OrderStatus::Ready,
            label: "Ready",
        });
    }

    steps
}

/// Index into [`steps_for`] highlighted for `status`.
pub fn step_index(status: OrderStatus, mode: DiningMode) -> usize {
    match (status, mode) {
        (OrderStatus::Pending, _) => 0,
        (OrderStatus::Preparing, _) => 1,
        (OrderStatus::OutForDelivery, DiningMode::Delivery) => 2,
        (OrderStatus::Completed, DiningMode::Delivery) => 3,
        (OrderStatus::Ready | OrderStatus::Completed, _) => 2,
        _ => 0,
    }
}

/// Whether the tracker should celebrate the order as collectable/delivered.
pub fn is_finished(status: OrderStatus, mode: DiningMode) -> bool {
    match mode {
        DiningMode::Delivery => status == OrderStatus::Completed,
        _ => matches!(status, OrderStatus::Ready | OrderStatus::Completed),
    }
}

/// Customer side view of a submitted order.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerState {
    /// Server id, absent when the order only exists locally.
    pub order_id: Option<i32>,
    pub order_number: OrderNumber,
    pub dining_mode: DiningMode,
    /// Last status observed for this session.
    pub last_seen: OrderStatus,
    pub step: usize,
    pub finished: bool,
}

impl TrackerState {
    pub fn new(
        order_id: Option<i32>,
        order_number: OrderNumber,
        dining_mode: DiningMode,
        status: OrderStatus,
    ) -> Self {
        Self {
            order_id,
            order_number,
            dining_mode,
            last_seen: status,
            step: step_index(status, dining_mode),
            finished: is_finished(status, dining_mode),
        }
    }

    /// Record `status` and return the customer message when it differs from
    /// the last seen status. Duplicates and replays return `None`.
    pub fn apply(&mut self, status: OrderStatus) -> Option<&'static str> {
        if status == self.last_seen {
            return None;
        }
        self.last_seen = status;
        self.step = step_index(status, self.dining_mode);
        self.finished = is_finished(status, self.dining_mode);
        Some(status.customer_message())
    }

    pub fn steps(&self) -> Vec<TrackerStep> {
        steps_for(self.dining_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_indexes_branch_by_mode() {
        assert_eq!(step_index(OrderStatus::Pending, DiningMode::EatIn), 0);
        assert_eq!(step_index(OrderStatus::Preparing, DiningMode::TakeAway), 1);
        assert_eq!(step_index(OrderStatus::Ready, DiningMode::EatIn), 2);
        assert_eq!(step_index(OrderStatus::Completed, DiningMode::EatIn), 2);
        assert_eq!(step_index(OrderStatus::OutForDelivery, DiningMode::Delivery), 2);
        assert_eq!(step_index(OrderStatus::Completed, DiningMode::Delivery), 3);
        assert_eq!(steps_for(DiningMode::Delivery).len(), 4);
        assert_eq!(steps_for(DiningMode::EatIn).len(), 3);
    }

    #[test]
    fn unchanged_status_does_not_notify() {
        let mut state = TrackerState::new(
            Some(1),
            OrderNumber::new(101),
            DiningMode::EatIn,
            OrderStatus::Pending,
        );

        assert_eq!(
            state.apply(OrderStatus::Preparing),
            Some("Kitchen is preparing your meal")
        );
        assert_eq!(state.apply(OrderStatus::Preparing), None);
        assert_eq!(state.step, 1);
    }

    #[test]
    fn out_of_order_updates_follow_last_seen() {
        let mut state = TrackerState::new(
            Some(1),
            OrderNumber::new(101),
            DiningMode::EatIn,
            OrderStatus::Pending,
        );

        assert!(state.apply(OrderStatus::Ready).is_some());
        assert!(state.finished);
        assert!(state.apply(OrderStatus::Preparing).is_some());
        assert_eq!(state.step, 1);
        assert!(state.apply(OrderStatus::Preparing).is_none());
    }
}
