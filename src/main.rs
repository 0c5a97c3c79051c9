use std::env;

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;
use pushkind_common::middleware::RedirectUnauthorized;
use pushkind_common::models::config::CommonServerConfig;
use pushkind_common::routes::{logout, not_assigned};

use kiosk_orders::realtime::OrderFeed;
use kiosk_orders::repository::DieselRepository;
use kiosk_orders::routes::admin::{change_order_status, save_settings, show_orders, show_settings};
use kiosk_orders::routes::api::api_v1_settings;
use kiosk_orders::routes::kiosk::{
    add_to_cart, kiosk_action, open_product, place_order, select_dining_mode, show_kiosk,
    show_menu, show_tracker, submit_details, update_quantity,
};
use kiosk_orders::services::catalog::{SettingsCache, load_settings};
use kiosk_orders::services::kiosk::KioskRegistry;
use kiosk_orders::webhook::WebhookNotifier;

/// Process configuration read from the environment.
struct ServerConfig {
    database_url: String,
    address: String,
    port: u16,
    /// Raw cookie secret. A random key is used when absent.
    secret: Option<String>,
    auth_service_url: String,
    cookie_domain: String,
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl ServerConfig {
    fn from_env() -> Result<Self, String> {
        let port = env_or("PORT", "8080");
        let port = port.parse::<u16>().unwrap_or_else(|_| {
            log::warn!("Invalid PORT `{port}`, using 8080");
            8080
        });

        let auth_service_url = env::var("AUTH_SERVICE_URL")
            .map_err(|_| "AUTH_SERVICE_URL environment variable not set".to_string())?;

        Ok(Self {
            database_url: env_or("DATABASE_URL", "kiosk.db"),
            address: env_or("ADDRESS", "127.0.0.1"),
            port,
            secret: env::var("SECRET_KEY").ok(),
            auth_service_url,
            cookie_domain: env_or("DOMAIN", "localhost"),
        })
    }

    fn cookie_key(&self) -> Key {
        self.secret
            .as_deref()
            .map_or_else(Key::generate, |secret| Key::from(secret.as_bytes()))
    }

    fn common(&self) -> CommonServerConfig {
        CommonServerConfig {
            secret: self.secret.clone().unwrap_or_default(),
            auth_service_url: self.auth_service_url.clone(),
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(message) => {
            log::error!("{message}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(err) => {
            log::error!("Failed to open {}: {err}", config.database_url);
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    // Settings are read once; the kiosk keeps running on defaults if the
    // store is unavailable.
    let settings = web::Data::new(SettingsCache::new(load_settings(&repo)));
    let feed = web::Data::new(OrderFeed::new());
    let registry = web::Data::new(KioskRegistry::new());
    let notifier = web::Data::new(WebhookNotifier::new());

    let secret_key = config.cookie_key();
    let common_config = config.common();
    let cookie_domain = format!(".{}", config.cookie_domain);

    log::info!("Starting kiosk server on {}:{}", config.address, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(cookie_domain.clone()))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(api_v1_settings)
            .service(show_kiosk)
            .service(kiosk_action)
            .service(show_menu)
            .service(open_product)
            .service(add_to_cart)
            .service(update_quantity)
            .service(select_dining_mode)
            .service(submit_details)
            .service(place_order)
            .service(show_tracker)
            .service(not_assigned)
            .service(
                web::scope("/admin")
                    .wrap(RedirectUnauthorized)
                    .service(show_settings)
                    .service(save_settings)
                    .service(show_orders)
                    .service(change_order_status)
                    .service(logout),
            )
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(common_config.clone()))
            .app_data(settings.clone())
            .app_data(feed.clone())
            .app_data(registry.clone())
            .app_data(notifier.clone())
    })
    .bind((config.address.as_str(), config.port))?
    .run()
    .await
}
