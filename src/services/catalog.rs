use std::sync::{Arc, PoisonError, RwLock};

use chrono::NaiveDateTime;
use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::routes::check_role;
use serde::Serialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::category::{Category, MenuQuery, RECOMMENDED_CATEGORY_ID};
use crate::domain::product::Product;
use crate::domain::settings::AppSettings;
use crate::forms::catalog::SaveSettingsForm;
use crate::repository::{SettingsReader, SettingsWriter};
use crate::services::{ServiceError, ServiceResult};

/// Read-mostly snapshot of the brand configuration and catalog.
///
/// Readers get an `Arc` to the snapshot that was current when they asked;
/// an admin save swaps in a new snapshot wholesale.
#[derive(Debug)]
pub struct SettingsCache {
    current: RwLock<Arc<AppSettings>>,
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new(AppSettings::default())
    }
}

impl SettingsCache {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            current: RwLock::new(Arc::new(settings)),
        }
    }

    pub fn current(&self) -> Arc<AppSettings> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn replace(&self, settings: AppSettings) -> Arc<AppSettings> {
        let settings = Arc::new(settings);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&settings);
        settings
    }
}

/// Load the stored settings, falling back to the built-in defaults when the
/// store is empty or unreachable.
pub fn load_settings<R>(repo: &R) -> AppSettings
where
    R: SettingsReader + ?Sized,
{
    match repo.get_settings() {
        Ok(Some(settings)) => settings,
        Ok(None) => {
            log::info!("No stored kiosk settings, using defaults");
            AppSettings::default()
        }
        Err(err) => {
            log::error!("Failed to load kiosk settings, using defaults: {err}");
            AppSettings::default()
        }
    }
}

/// Menu payload for the customer screen.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuPage {
    pub brand_name: String,
    pub currency: String,
    /// Category tabs, led by the virtual recommended tab.
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub is_open: bool,
    pub is_holiday: bool,
}

pub fn load_menu(settings: &AppSettings, query: &MenuQuery, now: NaiveDateTime) -> MenuPage {
    let mut categories = Vec::with_capacity(settings.categories.len() + 1);
    categories.push(Category::new(RECOMMENDED_CATEGORY_ID, "RECOMMENDED", "⭐"));
    categories.extend(settings.categories.iter().cloned());

    MenuPage {
        brand_name: settings.brand_name.clone(),
        currency: settings.currency.clone(),
        categories,
        products: query.apply(&settings.products).into_iter().cloned().collect(),
        is_open: settings.is_open_at(now),
        is_holiday: settings.is_holiday(now.date()),
    }
}

/// Settings shown in the admin editor.
pub fn load_admin_settings(
    cache: &SettingsCache,
    user: &AuthenticatedUser,
) -> ServiceResult<Arc<AppSettings>> {
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    Ok(cache.current())
}

/// Replace the stored settings and the in-memory snapshot.
///
/// The store is written first; the cache only changes when the write
/// succeeded.
pub fn save_settings<R>(
    repo: &R,
    cache: &SettingsCache,
    user: &AuthenticatedUser,
    form: SaveSettingsForm,
) -> ServiceResult<Arc<AppSettings>>
where
    R: SettingsWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let settings = form
        .into_settings()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if let Err(err) = repo.replace_settings(&settings) {
        log::error!("Failed to save kiosk settings: {err}");
        return Err(ServiceError::from(err));
    }

    log::info!(
        "Kiosk settings saved by {}: {} categories, {} products",
        user.email,
        settings.categories.len(),
        settings.products.len()
    );

    Ok(cache.replace(settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};
    use pushkind_common::repository::errors::RepositoryError;

    use crate::forms::catalog::{CategoryForm, PriceInput, ProductForm, WorkingHoursForm};
    use crate::repository::mock::{MockSettingsReader, MockSettingsWriter};

    fn user_with_roles(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "user-1".to_string(),
            email: "user@example.com".to_string(),
            hub_id: 9,
            name: "Tester".to_string(),
            roles: roles.iter().map(|role| (*role).to_string()).collect(),
            exp: 0,
        }
    }

    fn noon(date: NaiveDate) -> NaiveDateTime {
        date.and_hms_opt(12, 0, 0).unwrap_or_default()
    }

    fn save_form() -> SaveSettingsForm {
        let week = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];

        SaveSettingsForm {
            brand_name: "Pizza Place".to_string(),
            primary_color: "#123456".to_string(),
            theme_mode: "dark".to_string(),
            currency: "€".to_string(),
            categories: vec![CategoryForm {
                id: "PIZZA".to_string(),
                label: "Pizza".to_string(),
                icon: "🍕".to_string(),
                background_image: None,
            }],
            products: vec![ProductForm {
                id: "p1".to_string(),
                name: "Margherita".to_string(),
                price: PriceInput::Number(8.5),
                category_id: "PIZZA".to_string(),
                description: String::new(),
                image: None,
                is_bestseller: true,
                is_available: true,
                is_vegetarian: true,
                sizes: vec![],
                addons: vec![],
            }],
            working_hours: week
                .iter()
                .map(|day| WorkingHoursForm {
                    day: *day,
                    is_open: true,
                    open_time: "09:00".to_string(),
                    close_time: "21:00".to_string(),
                })
                .collect(),
            force_holidays: vec![],
            notification_webhook_url: None,
        }
    }

    #[test]
    fn load_settings_prefers_stored_snapshot() {
        let mut repo = MockSettingsReader::new();
        repo.expect_get_settings().times(1).returning(|| {
            Ok(Some(AppSettings {
                brand_name: "Stored".to_string(),
                ..AppSettings::default()
            }))
        });

        assert_eq!(load_settings(&repo).brand_name, "Stored");
    }

    #[test]
    fn load_settings_falls_back_on_error() {
        let mut repo = MockSettingsReader::new();
        repo.expect_get_settings()
            .times(1)
            .returning(|| Err(RepositoryError::NotFound));

        assert_eq!(load_settings(&repo), AppSettings::default());
    }

    #[test]
    fn load_settings_falls_back_when_empty() {
        let mut repo = MockSettingsReader::new();
        repo.expect_get_settings().times(1).returning(|| Ok(None));

        assert_eq!(load_settings(&repo), AppSettings::default());
    }

    #[test]
    fn menu_lists_recommended_tab_and_bestsellers() {
        let settings = AppSettings::default();
        let query = MenuQuery::default().category(RECOMMENDED_CATEGORY_ID);
        let now = noon(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap_or_default());

        let page = load_menu(&settings, &query, now);

        assert_eq!(page.categories[0].id, RECOMMENDED_CATEGORY_ID);
        assert_eq!(page.categories.len(), settings.categories.len() + 1);
        assert!(!page.products.is_empty());
        assert!(page.products.iter().all(|product| product.is_bestseller));
        assert!(page.is_open);
        assert!(!page.is_holiday);
    }

    #[test]
    fn menu_reports_holiday_as_closed() {
        let mut settings = AppSettings::default();
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap_or_default();
        settings.force_holidays.insert(date);

        let page = load_menu(&settings, &MenuQuery::default(), noon(date));

        assert!(page.is_holiday);
        assert!(!page.is_open);
    }

    #[test]
    fn save_settings_requires_role() {
        let repo = MockSettingsWriter::new();
        let cache = SettingsCache::default();
        let user = user_with_roles(&[]);

        let result = save_settings(&repo, &cache, &user, save_form());

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn save_settings_rejects_invalid_form() {
        let repo = MockSettingsWriter::new();
        let cache = SettingsCache::default();
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);
        let mut form = save_form();
        form.products[0].category_id = "MISSING".to_string();

        let result = save_settings(&repo, &cache, &user, form);

        match result {
            Err(ServiceError::Form(message)) => assert!(message.contains("MISSING")),
            other => panic!("expected form error, got {other:?}"),
        }
        assert_eq!(cache.current().brand_name, AppSettings::default().brand_name);
    }

    #[test]
    fn save_settings_replaces_store_and_cache() {
        let mut repo = MockSettingsWriter::new();
        let cache = SettingsCache::default();
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        repo.expect_replace_settings()
            .times(1)
            .withf(|settings| {
                assert_eq!(settings.brand_name, "Pizza Place");
                assert_eq!(settings.products.len(), 1);
                assert_eq!(settings.working_hours.len(), 7);
                true
            })
            .returning(|_| Ok(()));

        let saved = save_settings(&repo, &cache, &user, save_form()).expect("saved");

        assert_eq!(saved.brand_name, "Pizza Place");
        assert_eq!(cache.current().currency, "€");
    }

    #[test]
    fn save_settings_keeps_cache_when_store_fails() {
        let mut repo = MockSettingsWriter::new();
        let cache = SettingsCache::default();
        let user = user_with_roles(&[SERVICE_ACCESS_ROLE]);

        repo.expect_replace_settings()
            .times(1)
            .returning(|_| Err(RepositoryError::NotFound));

        let result = save_settings(&repo, &cache, &user, save_form());

        assert!(matches!(result, Err(ServiceError::Repository(_))));
        assert_eq!(cache.current().brand_name, AppSettings::default().brand_name);
    }
}
