use std::collections::{BTreeSet, HashSet};

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidateUrl, ValidationErrors};

use crate::domain::category::{Category, RECOMMENDED_CATEGORY_ID};
use crate::domain::money::{Money, MoneyParseError};
use crate::domain::product::{AddonOption, Product, SizeOption};
use crate::domain::settings::{AppSettings, WorkingHours};
use crate::forms::{sanitize_inline, sanitize_multiline, sanitize_optional};

const BRAND_MAX_LEN: u64 = 64;
const CURRENCY_MAX_LEN: u64 = 8;
const LABEL_MAX_LEN: u64 = 64;
const NAME_MAX_LEN: u64 = 128;
const DESCRIPTION_MAX_LEN: u64 = 1024;

/// Largest base price or option delta accepted from the editor.
pub const MAX_PRICE: Money = Money::from_cents(10_000_000);

const HOLIDAY_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub type SettingsFormResult<T> = Result<T, SettingsFormError>;

/// Reasons an admin save is rejected before it reaches the store.
#[derive(Debug, Error)]
pub enum SettingsFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("brand name cannot be empty")]
    EmptyBrandName,
    #[error("category id cannot be empty")]
    EmptyCategoryId,
    #[error("category id `{0}` is reserved")]
    ReservedCategoryId(String),
    #[error("category `{0}` is defined more than once")]
    DuplicateCategory(String),
    #[error("product id cannot be empty")]
    EmptyProductId,
    #[error("product `{0}` is defined more than once")]
    DuplicateProduct(String),
    #[error("product `{product_id}` references unknown category `{category_id}`")]
    UnknownCategory {
        product_id: String,
        category_id: String,
    },
    #[error("product `{product_id}` has an invalid price: {source}")]
    InvalidPrice {
        product_id: String,
        source: MoneyParseError,
    },
    #[error("product `{0}` cannot have a negative base price")]
    NegativePrice(String),
    #[error("product `{product_id}` has a price beyond {limit}")]
    PriceTooLarge { product_id: String, limit: Money },
    #[error("product `{0}` has an option without a label")]
    EmptyOptionLabel(String),
    #[error("working hours for {0} are defined more than once")]
    DuplicateWeekday(Weekday),
    #[error("working hours for {0} are missing")]
    MissingWeekday(Weekday),
    #[error("invalid time `{0}`, expected HH:MM")]
    InvalidTime(String),
    #[error("invalid holiday `{0}`, expected YYYY-MM-DD")]
    InvalidHoliday(String),
    #[error("invalid webhook url `{0}`")]
    InvalidWebhookUrl(String),
}

/// Price as sent by the admin screen: a JSON number or typed text.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    fn to_money(&self) -> Result<Money, MoneyParseError> {
        match self {
            PriceInput::Number(value) => Money::from_decimal(*value),
            PriceInput::Text(text) => Money::parse(text),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryForm {
    #[validate(length(max = LABEL_MAX_LEN))]
    pub id: String,
    #[validate(length(min = 1, max = LABEL_MAX_LEN))]
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub background_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OptionForm {
    #[validate(length(max = LABEL_MAX_LEN))]
    pub label: String,
    pub price: PriceInput,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    #[validate(length(max = LABEL_MAX_LEN))]
    pub id: String,
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    pub price: PriceInput,
    pub category_id: String,
    #[serde(default)]
    #[validate(length(max = DESCRIPTION_MAX_LEN))]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_bestseller: bool,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub is_vegetarian: bool,
    #[serde(default)]
    #[validate(nested)]
    pub sizes: Vec<OptionForm>,
    #[serde(default)]
    #[validate(nested)]
    pub addons: Vec<OptionForm>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHoursForm {
    pub day: Weekday,
    pub is_open: bool,
    #[serde(default)]
    pub open_time: String,
    #[serde(default)]
    pub close_time: String,
}

/// Full settings snapshot submitted by the admin editor.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveSettingsForm {
    #[validate(length(min = 1, max = BRAND_MAX_LEN))]
    pub brand_name: String,
    #[serde(default)]
    pub primary_color: String,
    #[serde(default)]
    pub theme_mode: String,
    #[validate(length(min = 1, max = CURRENCY_MAX_LEN))]
    pub currency: String,
    #[serde(default)]
    #[validate(nested)]
    pub categories: Vec<CategoryForm>,
    #[serde(default)]
    #[validate(nested)]
    pub products: Vec<ProductForm>,
    #[serde(default)]
    pub working_hours: Vec<WorkingHoursForm>,
    #[serde(default)]
    pub force_holidays: Vec<String>,
    #[serde(default)]
    pub notification_webhook_url: Option<String>,
}

impl SaveSettingsForm {
    /// Validate and sanitize the snapshot into domain settings.
    pub fn into_settings(self) -> SettingsFormResult<AppSettings> {
        self.validate()?;

        let brand_name = sanitize_inline(&self.brand_name);
        if brand_name.is_empty() {
            return Err(SettingsFormError::EmptyBrandName);
        }

        let defaults = AppSettings::default();
        let primary_color = match sanitize_inline(&self.primary_color) {
            color if color.is_empty() => defaults.primary_color,
            color => color,
        };

        let categories = parse_categories(self.categories)?;
        let known: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        let products = parse_products(self.products, &known)?;

        let working_hours = parse_working_hours(self.working_hours)?;

        let mut force_holidays = BTreeSet::new();
        for raw in &self.force_holidays {
            let date = NaiveDate::parse_from_str(raw.trim(), HOLIDAY_FORMAT)
                .map_err(|_| SettingsFormError::InvalidHoliday(raw.clone()))?;
            force_holidays.insert(date);
        }

        let notification_webhook_url = sanitize_optional(self.notification_webhook_url.as_deref());
        if let Some(url) = &notification_webhook_url {
            let http = url.starts_with("http://") || url.starts_with("https://");
            if !http || !url.validate_url() {
                return Err(SettingsFormError::InvalidWebhookUrl(url.clone()));
            }
        }

        Ok(AppSettings {
            brand_name,
            primary_color,
            theme_mode: self.theme_mode.trim().to_lowercase().as_str().into(),
            currency: sanitize_inline(&self.currency),
            categories,
            products,
            working_hours,
            force_holidays,
            notification_webhook_url,
        })
    }
}

fn parse_categories(forms: Vec<CategoryForm>) -> SettingsFormResult<Vec<Category>> {
    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(forms.len());

    for form in forms {
        let id = sanitize_inline(&form.id);
        if id.is_empty() {
            return Err(SettingsFormError::EmptyCategoryId);
        }
        if id == RECOMMENDED_CATEGORY_ID {
            return Err(SettingsFormError::ReservedCategoryId(id));
        }
        if !seen.insert(id.clone()) {
            return Err(SettingsFormError::DuplicateCategory(id));
        }

        let mut category = Category::new(id, sanitize_inline(&form.label), form.icon.trim());
        category.background_image = sanitize_optional(form.background_image.as_deref());
        categories.push(category);
    }

    Ok(categories)
}

fn parse_products(
    forms: Vec<ProductForm>,
    known_categories: &HashSet<&str>,
) -> SettingsFormResult<Vec<Product>> {
    let mut seen = HashSet::new();
    let mut products = Vec::with_capacity(forms.len());

    for form in forms {
        let id = sanitize_inline(&form.id);
        if id.is_empty() {
            return Err(SettingsFormError::EmptyProductId);
        }
        if !seen.insert(id.clone()) {
            return Err(SettingsFormError::DuplicateProduct(id));
        }

        let category_id = sanitize_inline(&form.category_id);
        if !known_categories.contains(category_id.as_str()) {
            return Err(SettingsFormError::UnknownCategory {
                product_id: id,
                category_id,
            });
        }

        let price = form
            .price
            .to_money()
            .map_err(|source| SettingsFormError::InvalidPrice {
                product_id: id.clone(),
                source,
            })?;
        if price.is_negative() {
            return Err(SettingsFormError::NegativePrice(id));
        }
        check_price_limit(&id, price)?;

        let sizes = parse_options(&id, form.sizes)?
            .into_iter()
            .map(|(label, price)| SizeOption::new(label, price))
            .collect();
        let addons = parse_options(&id, form.addons)?
            .into_iter()
            .map(|(label, price)| AddonOption::new(label, price))
            .collect();

        let mut product = Product::new(id, sanitize_inline(&form.name), price, category_id)
            .with_description(sanitize_multiline(&form.description))
            .with_sizes(sizes)
            .with_addons(addons);
        product.image = sanitize_optional(form.image.as_deref());
        product.is_bestseller = form.is_bestseller;
        product.is_available = form.is_available;
        product.is_vegetarian = form.is_vegetarian;
        products.push(product);
    }

    Ok(products)
}

/// Base prices and option deltas must stay within [`MAX_PRICE`] either way.
fn check_price_limit(product_id: &str, price: Money) -> SettingsFormResult<()> {
    if price.abs() > MAX_PRICE {
        return Err(SettingsFormError::PriceTooLarge {
            product_id: product_id.to_string(),
            limit: MAX_PRICE,
        });
    }
    Ok(())
}

fn parse_options(
    product_id: &str,
    forms: Vec<OptionForm>,
) -> SettingsFormResult<Vec<(String, Money)>> {
    forms
        .into_iter()
        .map(|form| {
            let label = sanitize_inline(&form.label);
            if label.is_empty() {
                return Err(SettingsFormError::EmptyOptionLabel(product_id.to_string()));
            }
            let price = form
                .price
                .to_money()
                .map_err(|source| SettingsFormError::InvalidPrice {
                    product_id: product_id.to_string(),
                    source,
                })?;
            check_price_limit(product_id, price)?;
            Ok((label, price))
        })
        .collect()
}

fn parse_time(raw: &str) -> SettingsFormResult<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| SettingsFormError::InvalidTime(raw.to_string()))
}

/// Require exactly one entry per weekday, returned Monday first.
fn parse_working_hours(forms: Vec<WorkingHoursForm>) -> SettingsFormResult<Vec<WorkingHours>> {
    let mut by_day: Vec<Option<WorkingHours>> = vec![None; WEEK.len()];

    for form in forms {
        let slot = form.day.num_days_from_monday() as usize;
        if by_day[slot].is_some() {
            return Err(SettingsFormError::DuplicateWeekday(form.day));
        }

        let hours = if form.is_open {
            WorkingHours::open(
                form.day,
                parse_time(&form.open_time)?,
                parse_time(&form.close_time)?,
            )
        } else {
            WorkingHours::closed(form.day)
        };
        by_day[slot] = Some(hours);
    }

    WEEK.iter()
        .zip(by_day)
        .map(|(day, hours)| hours.ok_or(SettingsFormError::MissingWeekday(*day)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn week_form() -> Vec<WorkingHoursForm> {
        WEEK.iter()
            .map(|day| WorkingHoursForm {
                day: *day,
                is_open: *day != Weekday::Sun,
                open_time: "10:00".to_string(),
                close_time: "23:00".to_string(),
            })
            .collect()
    }

    fn category(id: &str) -> CategoryForm {
        CategoryForm {
            id: id.to_string(),
            label: id.to_string(),
            icon: "🍔".to_string(),
            background_image: None,
        }
    }

    fn product(id: &str, category_id: &str, price: PriceInput) -> ProductForm {
        ProductForm {
            id: id.to_string(),
            name: format!("Product {id}"),
            price,
            category_id: category_id.to_string(),
            description: String::new(),
            image: None,
            is_bestseller: false,
            is_available: true,
            is_vegetarian: false,
            sizes: vec![],
            addons: vec![],
        }
    }

    fn base_form() -> SaveSettingsForm {
        SaveSettingsForm {
            brand_name: "  Chicken   House ".to_string(),
            primary_color: "#e4002b".to_string(),
            theme_mode: "Light".to_string(),
            currency: "$".to_string(),
            categories: vec![category("BURGERS")],
            products: vec![product("b1", "BURGERS", PriceInput::Number(12.5))],
            working_hours: week_form(),
            force_holidays: vec!["2025-12-25".to_string()],
            notification_webhook_url: Some("  ".to_string()),
        }
    }

    #[test]
    fn converts_valid_snapshot() {
        let settings = base_form().into_settings().expect("valid settings");

        assert_eq!(settings.brand_name, "Chicken House");
        assert_eq!(settings.theme_mode, crate::domain::settings::ThemeMode::Light);
        assert_eq!(settings.products[0].price, Money::from_cents(1250));
        assert_eq!(settings.working_hours.len(), 7);
        assert!(!settings.working_hours[6].is_open);
        assert!(settings.is_holiday(NaiveDate::from_ymd_opt(2025, 12, 25).unwrap()));
        assert_eq!(settings.notification_webhook_url, None);
    }

    #[test]
    fn rejects_unknown_category() {
        let mut form = base_form();
        form.products = vec![product("b1", "PIZZA", PriceInput::Number(5.0))];

        match form.into_settings() {
            Err(SettingsFormError::UnknownCategory {
                product_id,
                category_id,
            }) => {
                assert_eq!(product_id, "b1");
                assert_eq!(category_id, "PIZZA");
            }
            other => panic!("expected unknown category error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut form = base_form();
        form.categories.push(category("BURGERS"));
        assert!(matches!(
            form.into_settings(),
            Err(SettingsFormError::DuplicateCategory(_))
        ));

        let mut form = base_form();
        form.products.push(product("b1", "BURGERS", PriceInput::Number(1.0)));
        assert!(matches!(
            form.into_settings(),
            Err(SettingsFormError::DuplicateProduct(_))
        ));
    }

    #[test]
    fn rejects_reserved_category() {
        let mut form = base_form();
        form.categories.push(category(RECOMMENDED_CATEGORY_ID));

        assert!(matches!(
            form.into_settings(),
            Err(SettingsFormError::ReservedCategoryId(_))
        ));
    }

    #[test]
    fn parses_text_prices_and_options() {
        let mut form = base_form();
        let mut burger = product("b1", "BURGERS", PriceInput::Text("9,99".to_string()));
        burger.sizes = vec![OptionForm {
            label: "Large".to_string(),
            price: PriceInput::Text("1.50".to_string()),
        }];
        form.products = vec![burger];

        let settings = form.into_settings().expect("valid settings");
        let product = &settings.products[0];
        assert_eq!(product.price, Money::from_cents(999));
        assert_eq!(product.sizes[0].price, Money::from_cents(150));
    }

    #[test]
    fn rejects_invalid_price() {
        let mut form = base_form();
        form.products = vec![product("b1", "BURGERS", PriceInput::Text("cheap".to_string()))];

        assert!(matches!(
            form.into_settings(),
            Err(SettingsFormError::InvalidPrice { .. })
        ));

        let mut form = base_form();
        form.products = vec![product("b1", "BURGERS", PriceInput::Number(-1.0))];
        assert!(matches!(
            form.into_settings(),
            Err(SettingsFormError::NegativePrice(_))
        ));
    }

    #[test]
    fn rejects_prices_beyond_limit() {
        let mut form = base_form();
        form.products = vec![product("b1", "BURGERS", PriceInput::Text("1e17".to_string()))];
        assert!(matches!(
            form.into_settings(),
            Err(SettingsFormError::InvalidPrice {
                source: MoneyParseError::OutOfRange(_),
                ..
            })
        ));

        let mut form = base_form();
        form.products = vec![product("b1", "BURGERS", PriceInput::Number(100_000.01))];
        assert!(matches!(
            form.into_settings(),
            Err(SettingsFormError::PriceTooLarge { .. })
        ));

        let mut form = base_form();
        let mut burger = product("b1", "BURGERS", PriceInput::Number(5.0));
        burger.addons = vec![OptionForm {
            label: "Gold leaf".to_string(),
            price: PriceInput::Number(-2_000_000.0),
        }];
        form.products = vec![burger];
        assert!(matches!(
            form.into_settings(),
            Err(SettingsFormError::PriceTooLarge { .. })
        ));

        let mut form = base_form();
        form.products = vec![product("b1", "BURGERS", PriceInput::Number(100_000.0))];
        let settings = form.into_settings().expect("limit itself is accepted");
        assert_eq!(settings.products[0].price, MAX_PRICE);
    }

    #[test]
    fn requires_every_weekday_once() {
        let mut form = base_form();
        form.working_hours.pop();
        assert!(matches!(
            form.into_settings(),
            Err(SettingsFormError::MissingWeekday(Weekday::Sun))
        ));

        let mut form = base_form();
        form.working_hours[1].day = Weekday::Mon;
        assert!(matches!(
            form.into_settings(),
            Err(SettingsFormError::DuplicateWeekday(Weekday::Mon))
        ));
    }

    #[test]
    fn rejects_bad_holiday_and_webhook() {
        let mut form = base_form();
        form.force_holidays = vec!["25/12/2025".to_string()];
        assert!(matches!(
            form.into_settings(),
            Err(SettingsFormError::InvalidHoliday(_))
        ));

        let mut form = base_form();
        form.notification_webhook_url = Some("ftp://hooks.example.com".to_string());
        assert!(matches!(
            form.into_settings(),
            Err(SettingsFormError::InvalidWebhookUrl(_))
        ));

        let mut form = base_form();
        form.notification_webhook_url = Some(" https://hooks.example.com/order ".to_string());
        let settings = form.into_settings().expect("valid settings");
        assert_eq!(
            settings.webhook_url(),
            Some("https://hooks.example.com/order")
        );
    }
}
