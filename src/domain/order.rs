use chrono::NaiveDateTime;
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

use crate::domain::cart::CartItem;
use crate::domain::money::Money;
use crate::domain::session::{DiningMode, UserDetails};

/// Lifecycle states of a submitted order.
///
/// `pending -> preparing -> ready -> completed` for eat-in and take-away,
/// `pending -> preparing -> out_for_delivery -> completed` for delivery, with
/// `cancelled` reachable from any non-terminal status.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been submitted and awaits the kitchen.
    #[default]
    Pending,
    /// Kitchen is working on the order.
    Preparing,
    /// Order can be collected at the counter.
    Ready,
    /// Order left the kitchen with a courier.
    OutForDelivery,
    /// Order has been handed over.
    Completed,
    /// Order will not be fulfilled.
    Cancelled,
}

impl OrderStatus {
    pub const ACTIVE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    fn rank(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Preparing => 1,
            OrderStatus::Ready | OrderStatus::OutForDelivery => 2,
            OrderStatus::Completed => 3,
            OrderStatus::Cancelled => 4,
        }
    }

    /// Whether the status applies to orders served in `mode`.
    pub fn applies_to(self, mode: DiningMode) -> bool {
        match self {
            OrderStatus::Ready => mode != DiningMode::Delivery,
            OrderStatus::OutForDelivery => mode == DiningMode::Delivery,
            _ => true,
        }
    }

    /// Whether an order served in `mode` may move from `self` to `next`
    /// without going backwards.
    pub fn can_transition_to(self, next: OrderStatus, mode: DiningMode) -> bool {
        if self.is_terminal() || !next.applies_to(mode) {
            return false;
        }
        if next == OrderStatus::Cancelled {
            return true;
        }
        next.rank() > self.rank()
    }

    /// Message shown to the customer when the order reaches this status.
    pub fn customer_message(self) -> &'static str {
        match self {
            OrderStatus::Pending => "We received your order",
            OrderStatus::Preparing => "Kitchen is preparing your meal",
            OrderStatus::Ready => "Your order is ready",
            OrderStatus::OutForDelivery => "Your order is on the way",
            OrderStatus::Completed => "Your order is complete. Enjoy!",
            OrderStatus::Cancelled => "Your order was cancelled",
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        match value {
            "preparing" => OrderStatus::Preparing,
            "ready" => OrderStatus::Ready,
            "out_for_delivery" => OrderStatus::OutForDelivery,
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Pending,
        }
    }
}

impl From<OrderStatus> for &'static str {
    fn from(value: OrderStatus) -> Self {
        match value {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl From<OrderStatus> for String {
    fn from(value: OrderStatus) -> Self {
        <&'static str>::from(value).to_string()
    }
}

/// Three digit number shown to the customer. Display only, not an identifier.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderNumber(i32);

impl OrderNumber {
    pub const MIN: i32 = 100;
    pub const MAX: i32 = 999;

    pub fn new(value: i32) -> Self {
        Self(value)
    }

    /// Draw a number in `100..=999`.
    pub fn random() -> Self {
        Self(rand::random_range(Self::MIN..=Self::MAX))
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

/// Order persisted in the store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Order {
    /// Server generated identifier.
    pub id: i32,
    pub order_number: OrderNumber,
    pub customer_details: UserDetails,
    pub cart_items: Vec<CartItem>,
    pub total_price: Money,
    pub status: OrderStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Submission record built from the checkout session.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub customer_details: UserDetails,
    pub cart_items: Vec<CartItem>,
    pub total_price: Money,
    pub status: OrderStatus,
}

impl NewOrder {
    pub fn new(
        order_number: OrderNumber,
        customer_details: UserDetails,
        cart_items: Vec<CartItem>,
        total_price: Money,
    ) -> Self {
        Self {
            order_number,
            customer_details,
            cart_items,
            total_price,
            status: OrderStatus::default(),
        }
    }
}

/// Status change applied by kitchen staff.
#[derive(Debug, Clone)]
pub struct UpdateOrder {
    pub status: OrderStatus,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl UpdateOrder {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status,
            updated_at: chrono::Local::now().naive_utc(),
        }
    }
}

/// Query definition used to list orders for the kitchen feed.
#[derive(Debug, Clone, Default)]
pub struct OrderListQuery {
    /// Only return orders in one of these statuses.
    pub statuses: Option<Vec<OrderStatus>>,
    /// Only return orders with this display number.
    pub order_number: Option<OrderNumber>,
    pub pagination: Option<Pagination>,
}

impl OrderListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = OrderStatus>) -> Self {
        self.statuses = Some(statuses.into_iter().collect());
        self
    }

    pub fn active(self) -> Self {
        self.statuses(OrderStatus::ACTIVE)
    }

    pub fn order_number(mut self, order_number: OrderNumber) -> Self {
        self.order_number = Some(order_number);
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
