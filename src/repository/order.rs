use diesel::prelude::*;
use pushkind_common::repository::errors::RepositoryResult;

use crate::{
    domain::order::{
        NewOrder as DomainNewOrder, Order as DomainOrder, OrderListQuery, OrderNumber,
        OrderStatus, UpdateOrder as DomainUpdateOrder,
    },
    models::order::{NewOrder as DbNewOrder, Order as DbOrder, UpdateOrder as DbUpdateOrder},
    repository::{DieselRepository, OrderReader, OrderWriter},
};

fn status_names(statuses: &[OrderStatus]) -> Vec<&'static str> {
    statuses.iter().map(|status| (*status).into()).collect()
}

impl OrderReader for DieselRepository {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<DomainOrder>> {
        use crate::schema::orders;

        let mut conn = self.conn()?;
        let order = orders::table
            .filter(orders::id.eq(id))
            .first::<DbOrder>(&mut conn)
            .optional()?;

        Ok(order.map(DomainOrder::from))
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<DomainOrder>)> {
        use crate::schema::orders;

        let mut conn = self.conn()?;

        let OrderListQuery {
            statuses,
            order_number,
            pagination,
        } = query;

        let status_filter = statuses.as_deref().map(status_names);

        let mut count_query = orders::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(ref names) = status_filter {
            count_query = count_query.filter(orders::status.eq_any(names.clone()));
        }

        if let Some(number) = order_number {
            count_query = count_query.filter(orders::order_number.eq(number.value()));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = orders::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(ref names) = status_filter {
            items = items.filter(orders::status.eq_any(names.clone()));
        }

        if let Some(number) = order_number {
            items = items.filter(orders::order_number.eq(number.value()));
        }

        items = items.order((orders::created_at.desc(), orders::id.desc()));

        if let Some(pagination) = pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let orders = items
            .load::<DbOrder>(&mut conn)?
            .into_iter()
            .map(DomainOrder::from)
            .collect();

        Ok((total, orders))
    }

    fn order_number_in_use(&self, order_number: OrderNumber) -> RepositoryResult<bool> {
        use crate::schema::orders;

        let mut conn = self.conn()?;
        let active = status_names(&OrderStatus::ACTIVE);

        let count = orders::table
            .filter(orders::order_number.eq(order_number.value()))
            .filter(orders::status.eq_any(active))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count > 0)
    }
}

impl OrderWriter for DieselRepository {
    fn create_order(&self, new_order: &DomainNewOrder) -> RepositoryResult<DomainOrder> {
        use crate::schema::orders;

        let mut conn = self.conn()?;
        let db_new = DbNewOrder::from(new_order);

        let created = diesel::insert_into(orders::table)
            .values(&db_new)
            .get_result::<DbOrder>(&mut conn)?;

        Ok(DomainOrder::from(created))
    }

    fn update_order(
        &self,
        order_id: i32,
        updates: &DomainUpdateOrder,
    ) -> RepositoryResult<DomainOrder> {
        use crate::schema::orders;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateOrder::from(updates);

        let updated = diesel::update(orders::table.filter(orders::id.eq(order_id)))
            .set(&db_updates)
            .get_result::<DbOrder>(&mut conn)?;

        Ok(DomainOrder::from(updated))
    }
}
