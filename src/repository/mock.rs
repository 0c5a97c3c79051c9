use mockall::mock;

use super::{OrderReader, OrderWriter, SettingsReader, SettingsWriter};
use crate::domain::{
    order::{NewOrder, Order, OrderListQuery, OrderNumber, UpdateOrder},
    settings::AppSettings,
};
use pushkind_common::repository::errors::RepositoryResult;

mock! {
    pub SettingsReader {}

    impl SettingsReader for SettingsReader {
        fn get_settings(&self) -> RepositoryResult<Option<AppSettings>>;
    }
}

mock! {
    pub SettingsWriter {}

    impl SettingsWriter for SettingsWriter {
        fn replace_settings(&self, settings: &AppSettings) -> RepositoryResult<()>;
    }
}

mock! {
    pub OrderReader {}

    impl OrderReader for OrderReader {
        fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>>;
        fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
        fn order_number_in_use(&self, order_number: OrderNumber) -> RepositoryResult<bool>;
    }
}

mock! {
    pub OrderWriter {}

    impl OrderWriter for OrderWriter {
        fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order>;
        fn update_order(&self, order_id: i32, updates: &UpdateOrder) -> RepositoryResult<Order>;
    }
}

/// Combined order repository mock for services that read and write.
pub struct MockOrderRepo {
    pub reader: MockOrderReader,
    pub writer: MockOrderWriter,
}

impl MockOrderRepo {
    pub fn new() -> Self {
        Self {
            reader: MockOrderReader::new(),
            writer: MockOrderWriter::new(),
        }
    }
}

impl OrderReader for MockOrderRepo {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>> {
        self.reader.get_order_by_id(id)
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)> {
        self.reader.list_orders(query)
    }

    fn order_number_in_use(&self, order_number: OrderNumber) -> RepositoryResult<bool> {
        self.reader.order_number_in_use(order_number)
    }
}

impl OrderWriter for MockOrderRepo {
    fn create_order(&self, new_order: &NewOrder) -> RepositoryResult<Order> {
        self.writer.create_order(new_order)
    }

    fn update_order(&self, order_id: i32, updates: &UpdateOrder) -> RepositoryResult<Order> {
        self.writer.update_order(order_id, updates)
    }
}
