use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::category::Category as DomainCategory;
use crate::domain::product::Product as DomainProduct;
use crate::domain::settings::{AppSettings, WorkingHours};
use crate::models::{decode_json, encode_json};

/// Primary key of the singleton configuration row.
pub const CONFIG_ROW_ID: i32 = 1;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::kiosk_config)]
pub struct KioskConfig {
    pub id: i32,
    pub brand_name: String,
    pub primary_color: String,
    pub theme_mode: String,
    pub currency: String,
    pub working_hours: String,
    pub force_holidays: String,
    pub notification_webhook_url: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl KioskConfig {
    pub fn from_settings(settings: &AppSettings, updated_at: NaiveDateTime) -> Self {
        let theme: &'static str = settings.theme_mode.into();
        Self {
            id: CONFIG_ROW_ID,
            brand_name: settings.brand_name.clone(),
            primary_color: settings.primary_color.clone(),
            theme_mode: theme.to_string(),
            currency: settings.currency.clone(),
            working_hours: encode_json(&settings.working_hours, "kiosk_config.working_hours"),
            force_holidays: encode_json(&settings.force_holidays, "kiosk_config.force_holidays"),
            notification_webhook_url: settings.notification_webhook_url.clone(),
            updated_at,
        }
    }

    /// Assemble the full settings snapshot from the normalized rows.
    pub fn into_settings(
        self,
        categories: Vec<DomainCategory>,
        products: Vec<DomainProduct>,
    ) -> AppSettings {
        let mut working_hours: Vec<WorkingHours> =
            decode_json(&self.working_hours, "kiosk_config.working_hours");
        if working_hours.is_empty() {
            working_hours = AppSettings::default().working_hours;
        }
        let force_holidays: BTreeSet<NaiveDate> =
            decode_json(&self.force_holidays, "kiosk_config.force_holidays");

        AppSettings {
            brand_name: self.brand_name,
            primary_color: self.primary_color,
            theme_mode: self.theme_mode.as_str().into(),
            currency: self.currency,
            categories,
            products,
            working_hours,
            force_holidays,
            notification_webhook_url: self.notification_webhook_url,
        }
    }
}
