use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::order::{NewOrder, Order, OrderListQuery, OrderNumber, UpdateOrder};
use crate::domain::settings::AppSettings;

pub mod order;
pub mod settings;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read access to the brand configuration and catalog.
pub trait SettingsReader {
    /// Returns `None` when no configuration has been saved yet.
    fn get_settings(&self) -> RepositoryResult<Option<AppSettings>>;
}

/// Write access to the brand configuration and catalog.
pub trait SettingsWriter {
    /// Replace configuration, categories and products with `settings`.
    fn replace_settings(&self, settings: &AppSettings) -> RepositoryResult<()>;
}

/// Read-only operations over submitted orders.
pub trait OrderReader {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>>;
    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
    /// Whether an active order currently displays `order_number`.
    fn order_number_in_use(&self, order_number: OrderNumber) -> RepositoryResult<bool>;
}

/// Write operations over submitted orders.
pub trait OrderWriter {
    fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
    fn update_order(&self, order_id: i32, updates: &UpdateOrder) -> RepositoryResult<Order>;
}
