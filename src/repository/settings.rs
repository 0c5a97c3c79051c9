use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::{
        category::Category as DomainCategory, product::Product as DomainProduct,
        settings::AppSettings,
    },
    models::{
        category::Category as DbCategory,
        product::Product as DbProduct,
        settings::{CONFIG_ROW_ID, KioskConfig},
    },
    repository::{DieselRepository, SettingsReader, SettingsWriter},
};

impl SettingsReader for DieselRepository {
    fn get_settings(&self) -> RepositoryResult<Option<AppSettings>> {
        use crate::schema::{categories, kiosk_config, products};

        let mut conn = self.conn()?;

        let config = kiosk_config::table
            .filter(kiosk_config::id.eq(CONFIG_ROW_ID))
            .first::<KioskConfig>(&mut conn)
            .optional()?;

        let Some(config) = config else {
            return Ok(None);
        };

        let categories = categories::table
            .order((categories::position.asc(), categories::id.asc()))
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(DomainCategory::from)
            .collect();

        let products = products::table
            .order((products::position.asc(), products::id.asc()))
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(DomainProduct::from)
            .collect();

        Ok(Some(config.into_settings(categories, products)))
    }
}

impl SettingsWriter for DieselRepository {
    fn replace_settings(&self, settings: &AppSettings) -> RepositoryResult<()> {
        use crate::schema::{categories, kiosk_config, products};

        let mut conn = self.conn()?;

        let config = KioskConfig::from_settings(settings, chrono::Local::now().naive_utc());
        let category_rows: Vec<DbCategory> = settings
            .categories
            .iter()
            .enumerate()
            .map(|(position, category)| DbCategory::from_domain(category, position))
            .collect();
        let product_rows: Vec<DbProduct> = settings
            .products
            .iter()
            .enumerate()
            .map(|(position, product)| DbProduct::from_domain(product, position))
            .collect();

        // Full replace inside one transaction: a failure leaves the previous
        // snapshot intact.
        conn.transaction::<(), RepositoryError, _>(|conn| {
            diesel::replace_into(kiosk_config::table)
                .values(&config)
                .execute(conn)?;

            diesel::delete(categories::table).execute(conn)?;
            if !category_rows.is_empty() {
                diesel::insert_into(categories::table)
                    .values(&category_rows)
                    .execute(conn)?;
            }

            diesel::delete(products::table).execute(conn)?;
            if !product_rows.is_empty() {
                diesel::insert_into(products::table)
                    .values(&product_rows)
                    .execute(conn)?;
            }

            Ok(())
        })
    }
}
