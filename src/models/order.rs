use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::money::Money;
use crate::domain::order::{
    NewOrder as DomainNewOrder, Order as DomainOrder, OrderNumber,
    UpdateOrder as DomainUpdateOrder,
};
use crate::models::{decode_json, encode_json};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub id: i32,
    pub order_number: i32,
    pub customer_details: String,
    pub cart_items: String,
    pub total_cents: i64,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder<'a> {
    pub order_number: i32,
    pub customer_details: String,
    pub cart_items: String,
    pub total_cents: i64,
    pub status: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::orders)]
pub struct UpdateOrder<'a> {
    pub status: &'a str,
    pub updated_at: NaiveDateTime,
}

impl From<Order> for DomainOrder {
    fn from(value: Order) -> Self {
        Self {
            id: value.id,
            order_number: OrderNumber::new(value.order_number),
            customer_details: decode_json(&value.customer_details, "orders.customer_details"),
            cart_items: decode_json(&value.cart_items, "orders.cart_items"),
            total_price: Money::from_cents(value.total_cents),
            status: value.status.as_str().into(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<&DomainNewOrder> for NewOrder<'static> {
    fn from(value: &DomainNewOrder) -> Self {
        Self {
            order_number: value.order_number.value(),
            customer_details: encode_json(&value.customer_details, "orders.customer_details"),
            cart_items: encode_json(&value.cart_items, "orders.cart_items"),
            total_cents: value.total_price.cents(),
            status: value.status.into(),
        }
    }
}

impl From<&DomainUpdateOrder> for UpdateOrder<'static> {
    fn from(value: &DomainUpdateOrder) -> Self {
        Self {
            status: value.status.into(),
            updated_at: value.updated_at,
        }
    }
}
