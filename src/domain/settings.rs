use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::money::Money;
use crate::domain::product::{AddonOption, Product, SizeOption};

/// Color scheme used by the kiosk shell.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl From<&str> for ThemeMode {
    fn from(value: &str) -> Self {
        match value {
            "light" => ThemeMode::Light,
            _ => ThemeMode::Dark,
        }
    }
}

impl From<ThemeMode> for &'static str {
    fn from(value: ThemeMode) -> Self {
        match value {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

/// Opening hours for a single weekday.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub day: Weekday,
    pub is_open: bool,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

impl WorkingHours {
    pub fn open(day: Weekday, open_time: NaiveTime, close_time: NaiveTime) -> Self {
        Self {
            day,
            is_open: true,
            open_time,
            close_time,
        }
    }

    pub fn closed(day: Weekday) -> Self {
        Self {
            day,
            is_open: false,
            open_time: NaiveTime::MIN,
            close_time: NaiveTime::MIN,
        }
    }

    /// Whether `time` falls inside the opening window. A close time at or
    /// before the open time means the window runs past midnight.
    pub fn covers(&self, time: NaiveTime) -> bool {
        if !self.is_open {
            return false;
        }
        if self.open_time < self.close_time {
            time >= self.open_time && time < self.close_time
        } else {
            time >= self.open_time || time < self.close_time
        }
    }
}

/// Brand configuration and catalog snapshot loaded at startup.
///
/// Admin saves replace the whole snapshot; there is no field level update.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub brand_name: String,
    pub primary_color: String,
    pub theme_mode: ThemeMode,
    /// Currency symbol shown next to prices.
    pub currency: String,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    /// One entry per weekday.
    pub working_hours: Vec<WorkingHours>,
    /// Dates on which ordering is disabled regardless of working hours.
    pub force_holidays: BTreeSet<NaiveDate>,
    /// Optional endpoint receiving new order notifications.
    #[serde(default)]
    pub notification_webhook_url: Option<String>,
}

impl AppSettings {
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.force_holidays.contains(&date)
    }

    pub fn hours_for(&self, day: Weekday) -> Option<&WorkingHours> {
        self.working_hours.iter().find(|hours| hours.day == day)
    }

    /// Whether the kiosk accepts orders at `now`, taking holidays into account.
    pub fn is_open_at(&self, now: NaiveDateTime) -> bool {
        if self.is_holiday(now.date()) {
            return false;
        }
        self.hours_for(now.weekday())
            .is_some_and(|hours| hours.covers(now.time()))
    }

    /// Webhook endpoint, ignoring blank values.
    pub fn webhook_url(&self) -> Option<&str> {
        self.notification_webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for AppSettings {
    /// Built-in settings used when the store is empty or unreachable.
    fn default() -> Self {
        let categories = vec![
            Category::new("BURGERS", "BURGERS", "🍔"),
            Category::new("BUCKETS", "BUCKETS", "🍗"),
            Category::new("MEALS", "BOX MEALS", "🍱"),
            Category::new("SIDES", "SIDES", "🍟"),
            Category::new("DRINKS", "DRINKS", "🥤"),
            Category::new("DESSERTS", "DESSERTS", "🍦"),
        ];

        let burger_sizes = vec![
            SizeOption::new("Regular", Money::ZERO),
            SizeOption::new("Large", Money::from_cents(300)),
        ];
        let burger_addons = vec![
            AddonOption::new("Cheese", Money::from_cents(150)),
            AddonOption::new("Bacon", Money::from_cents(250)),
        ];

        let products = vec![
            Product::new("b1", "Kentucky Gold Grander", Money::from_cents(3395), "BURGERS")
                .with_description("Bacon, onion rings, cheddar cheese and BBQ sauce with crispy chicken.")
                .with_sizes(burger_sizes.clone())
                .with_addons(burger_addons.clone())
                .bestseller(),
            Product::new("b2", "Double Grander", Money::from_cents(2995), "BURGERS")
                .with_description("Double chicken fillet, cheese, and fresh lettuce.")
                .with_sizes(burger_sizes.clone())
                .with_addons(burger_addons.clone()),
            Product::new("b3", "Halloumi Burger", Money::from_cents(1695), "BURGERS")
                .with_description("Crispy halloumi cheese with fresh vegetables.")
                .with_sizes(burger_sizes.clone())
                .vegetarian()
                .bestseller(),
            Product::new("b4", "Zinger", Money::from_cents(2195), "BURGERS")
                .with_description("The spicy classic everyone loves.")
                .with_sizes(burger_sizes)
                .with_addons(burger_addons),
            Product::new("k1", "15 Hot Wings Bucket", Money::from_cents(4500), "BUCKETS")
                .with_description("The ultimate bucket for spice lovers."),
            Product::new("k2", "Classic Bucket", Money::from_cents(5250), "BUCKETS")
                .with_description("Original recipe chicken for the whole family."),
            Product::new("s1", "Large Fries", Money::from_cents(850), "SIDES")
                .with_description("Golden, crispy, and perfectly salted.")
                .vegetarian(),
            Product::new("d1", "Coca-Cola 0.5L", Money::from_cents(700), "DRINKS")
                .with_description("Refreshing cold beverage."),
        ];

        Self {
            brand_name: "Kiosk".to_string(),
            primary_color: "#2563EB".to_string(),
            theme_mode: ThemeMode::Dark,
            currency: "$".to_string(),
            categories,
            products,
            working_hours: WEEK
                .iter()
                .map(|day| WorkingHours::open(*day, hm(10, 0), hm(23, 0)))
                .collect(),
            force_holidays: BTreeSet::new(),
            notification_webhook_url: None,
        }
    }
}
