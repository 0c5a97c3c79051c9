use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::DEFAULT_ITEMS_PER_PAGE;
use pushkind_common::routes::check_role;
use serde::Serialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::order::{Order, OrderListQuery, OrderNumber, OrderStatus, UpdateOrder};
use crate::forms::orders::{ChangeStatusForm, OrdersQuery};
use crate::realtime::{OrderChange, OrderFeed};
use crate::repository::{OrderReader, OrderWriter};
use crate::services::{ServiceError, ServiceResult};

/// One page of the kitchen feed.
#[derive(Debug, Serialize)]
pub struct OrdersPage {
    pub orders: Vec<Order>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

/// Loads the kitchen feed: most recent orders first, active ones only unless
/// finished orders are requested.
pub fn load_recent_orders<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: OrdersQuery,
) -> ServiceResult<OrdersPage>
where
    R: OrderReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let page = query.page.unwrap_or(1).max(1);
    let mut list_query = OrderListQuery::new().paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if !query.include_finished {
        list_query = list_query.active();
    }
    if let Some(number) = query.order_number {
        list_query = list_query.order_number(OrderNumber::new(number));
    }

    let (total, orders) = repo.list_orders(list_query).map_err(ServiceError::from)?;
    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);

    Ok(OrdersPage {
        orders,
        page,
        total_pages,
        total,
    })
}

/// Move an order to a new status and announce it on the feed.
///
/// Transitions must follow the lifecycle: forward only, with cancellation
/// allowed until the order is completed.
pub fn change_order_status<R>(
    repo: &R,
    feed: &OrderFeed,
    user: &AuthenticatedUser,
    order_id: i32,
    form: ChangeStatusForm,
) -> ServiceResult<Order>
where
    R: OrderReader + OrderWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let order = repo
        .get_order_by_id(order_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    let next = form.status;
    let mode = order.customer_details.dining_mode;
    if !order.status.can_transition_to(next, mode) {
        let from: &'static str = order.status.into();
        let to: &'static str = next.into();
        return Err(ServiceError::Conflict(format!(
            "{} order #{} cannot move from {from} to {to}",
            mode.label(),
            order.order_number.value()
        )));
    }

    let updated = repo
        .update_order(order_id, &UpdateOrder::status(next))
        .map_err(ServiceError::from)?;

    log::info!(
        "Order #{} ({}) set to {} by {}",
        updated.order_number.value(),
        updated.id,
        <&'static str>::from(updated.status),
        user.email
    );
    feed.publish(&OrderChange::Updated(updated.clone()));

    Ok(updated)
}

/// Statuses offered to the kitchen for `order`.
pub fn next_statuses(order: &Order) -> Vec<OrderStatus> {
    let status = order.status;
    let mode = order.customer_details.dining_mode;
    [
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ]
    .into_iter()
    .filter(|next| status.can_transition_to(*next, mode))
    .collect()
}
