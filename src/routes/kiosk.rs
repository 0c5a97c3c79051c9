use std::sync::{MutexGuard, PoisonError};

use actix_session::Session;
use actix_web::{HttpResponse, Responder, get, post, web};
use serde_json::json;

use crate::domain::category::MenuQuery;
use crate::domain::flow::{FlowError, KioskAction};
use crate::forms::checkout::{AddToCartForm, DiningModeForm, UpdateQuantityForm, UserDetailsForm};
use crate::realtime::OrderFeed;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::catalog::{SettingsCache, load_menu};
use crate::services::kiosk::{self as kiosk_service, KioskRegistry, KioskSession, SharedKiosk};
use crate::services::ServiceError;
use crate::webhook::WebhookNotifier;

/// Cookie session key holding the kiosk session id.
const KIOSK_ID_KEY: &str = "kiosk_id";

/// Resolve the kiosk session of this browser, starting a new one if needed.
fn kiosk_for(session: &Session, registry: &KioskRegistry) -> SharedKiosk {
    let known = session.get::<String>(KIOSK_ID_KEY).unwrap_or_else(|err| {
        log::warn!("Ignoring unreadable kiosk session cookie: {err}");
        None
    });

    let (id, kiosk) = registry.open(known.as_deref());
    if known.as_deref() != Some(id.as_str())
        && let Err(err) = session.insert(KIOSK_ID_KEY, &id)
    {
        log::error!("Failed to store kiosk session id: {err}");
    }

    kiosk
}

fn lock(kiosk: &SharedKiosk) -> MutexGuard<'_, KioskSession> {
    kiosk.lock().unwrap_or_else(PoisonError::into_inner)
}

fn flow_error(err: FlowError) -> HttpResponse {
    error_response(&ServiceError::Flow(err), "Kiosk flow error")
}

#[get("/kiosk")]
pub async fn show_kiosk(session: Session, registry: web::Data<KioskRegistry>) -> impl Responder {
    let kiosk = kiosk_for(&session, &registry);
    let snapshot = lock(&kiosk).snapshot();
    HttpResponse::Ok().json(snapshot)
}

#[post("/kiosk/actions")]
pub async fn kiosk_action(
    session: Session,
    registry: web::Data<KioskRegistry>,
    cache: web::Data<SettingsCache>,
    action: web::Json<KioskAction>,
) -> impl Responder {
    let kiosk = kiosk_for(&session, &registry);
    let settings = cache.current();
    let mut kiosk = lock(&kiosk);

    match kiosk.navigate(&settings, action.into_inner()) {
        Ok(_) => HttpResponse::Ok().json(kiosk.snapshot()),
        Err(err) => flow_error(err),
    }
}

#[get("/kiosk/menu")]
pub async fn show_menu(
    params: web::Query<MenuQuery>,
    cache: web::Data<SettingsCache>,
) -> impl Responder {
    let settings = cache.current();
    let now = chrono::Local::now().naive_local();
    HttpResponse::Ok().json(load_menu(&settings, &params, now))
}

#[post("/kiosk/products/{product_id}")]
pub async fn open_product(
    session: Session,
    registry: web::Data<KioskRegistry>,
    cache: web::Data<SettingsCache>,
    product_id: web::Path<String>,
) -> impl Responder {
    let kiosk = kiosk_for(&session, &registry);
    let settings = cache.current();
    let mut kiosk = lock(&kiosk);
    let action = KioskAction::OpenProduct {
        product_id: product_id.into_inner(),
    };

    match kiosk.navigate(&settings, action) {
        Ok(_) => HttpResponse::Ok().json(kiosk.snapshot()),
        Err(err) => flow_error(err),
    }
}

#[post("/kiosk/cart/add")]
pub async fn add_to_cart(
    session: Session,
    registry: web::Data<KioskRegistry>,
    cache: web::Data<SettingsCache>,
    form: web::Json<AddToCartForm>,
) -> impl Responder {
    let form = match form.into_inner().sanitized() {
        Ok(form) => form,
        Err(err) => return error_response(&ServiceError::Form(err.to_string()), "Add to cart"),
    };

    let kiosk = kiosk_for(&session, &registry);
    let settings = cache.current();
    let today = chrono::Local::now().date_naive();
    let mut kiosk = lock(&kiosk);

    match kiosk.add_to_cart(&settings, form, today) {
        Ok(_) => HttpResponse::Ok().json(kiosk.snapshot()),
        Err(err) => flow_error(err),
    }
}

#[post("/kiosk/cart/quantity")]
pub async fn update_quantity(
    session: Session,
    registry: web::Data<KioskRegistry>,
    form: web::Json<UpdateQuantityForm>,
) -> impl Responder {
    let (target, delta) = match form.into_inner().into_target() {
        Ok(parsed) => parsed,
        Err(err) => {
            return error_response(&ServiceError::Form(err.to_string()), "Update quantity");
        }
    };

    let kiosk = kiosk_for(&session, &registry);
    let mut kiosk = lock(&kiosk);
    kiosk.update_quantity(&target, delta);
    HttpResponse::Ok().json(kiosk.snapshot())
}

#[post("/kiosk/dining-mode")]
pub async fn select_dining_mode(
    session: Session,
    registry: web::Data<KioskRegistry>,
    form: web::Json<DiningModeForm>,
) -> impl Responder {
    let kiosk = kiosk_for(&session, &registry);
    let mut kiosk = lock(&kiosk);

    match kiosk.select_dining_mode(form.dining_mode) {
        Ok(_) => HttpResponse::Ok().json(kiosk.snapshot()),
        Err(err) => flow_error(err),
    }
}

#[post("/kiosk/details")]
pub async fn submit_details(
    session: Session,
    registry: web::Data<KioskRegistry>,
    form: web::Json<UserDetailsForm>,
) -> impl Responder {
    let kiosk = kiosk_for(&session, &registry);
    let mut kiosk = lock(&kiosk);

    match kiosk_service::submit_details(&mut kiosk, form.into_inner()) {
        Ok(_) => HttpResponse::Ok().json(kiosk.snapshot()),
        Err(err) => error_response(&err, "Submit details"),
    }
}

#[post("/kiosk/orders")]
pub async fn place_order(
    session: Session,
    registry: web::Data<KioskRegistry>,
    cache: web::Data<SettingsCache>,
    repo: web::Data<DieselRepository>,
    feed: web::Data<OrderFeed>,
    notifier: web::Data<WebhookNotifier>,
) -> impl Responder {
    let kiosk = kiosk_for(&session, &registry);
    let settings = cache.current();
    let mut kiosk = lock(&kiosk);

    match kiosk_service::place_order(
        repo.get_ref(),
        feed.get_ref(),
        notifier.get_ref(),
        &settings,
        &mut kiosk,
    ) {
        Ok(outcome) => HttpResponse::Ok().json(json!({
            "order": outcome,
            "kiosk": kiosk.snapshot(),
        })),
        Err(err) => error_response(&err, "Place order"),
    }
}

#[get("/kiosk/tracker")]
pub async fn show_tracker(
    session: Session,
    registry: web::Data<KioskRegistry>,
) -> impl Responder {
    let kiosk = kiosk_for(&session, &registry);
    let snapshot = lock(&kiosk).snapshot();

    match snapshot.tracker {
        Some(tracker) => HttpResponse::Ok().json(json!({
            "tracker": tracker,
            "toasts": snapshot.toasts,
        })),
        None => error_response(&ServiceError::NotFound, "Show tracker"),
    }
}
